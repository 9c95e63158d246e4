//! Hit point source trait definition.

use std::time::Duration;

use async_trait::async_trait;

use crate::fetch::errors::FetchError;
use crate::fetch::types::Character;
use crate::roster::RosterMember;

/// Anything that can read one character's current and max hit points.
///
/// The page layout, selectors and device emulation all live behind this
/// trait, so the coordinator never knows how HP is obtained.
#[async_trait]
pub trait HpSource: Send + Sync {
    /// Fetch HP for `member`, giving up after `timeout`.
    ///
    /// Returns either a complete [`Character`] or an error naming the
    /// character; never partial data.
    async fn fetch(&self, member: &RosterMember, timeout: Duration)
    -> Result<Character, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource;

    #[async_trait]
    impl HpSource for FixedSource {
        async fn fetch(
            &self,
            member: &RosterMember,
            _timeout: Duration,
        ) -> Result<Character, FetchError> {
            Ok(Character {
                id: member.id.clone(),
                name: member.name.clone(),
                current_hp: "7".to_string(),
                max_hp: "9".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_source_is_object_safe() {
        let source: Box<dyn HpSource> = Box::new(FixedSource);
        let character = source
            .fetch(&RosterMember::new("1", "Aldric"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(character.name, "Aldric");
        assert_eq!(character.current_hp, "7");
    }
}
