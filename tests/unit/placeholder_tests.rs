/*!
 * Tests for placeholder locking with the built-in profiles
 */

use seedloc::placeholder::{PlaceholderLocker, find_tokens};
use seedloc::profile::DomainProfile;

fn locker(profile: &str) -> PlaceholderLocker {
    PlaceholderLocker::from_profile(&DomainProfile::builtin(profile).unwrap()).unwrap()
}

#[test]
fn test_lock_withSlackMentions_shouldHideMentionsAndEmoji() {
    let locked = locker("slack").lock("Hey <@U024BE7LH>, see <#C123|general> :wave:");

    assert_eq!(find_tokens(&locked.text).len(), 3);
    assert!(!locked.text.contains("U024BE7LH"));
    assert!(locked.text.starts_with("Hey "));
    assert_eq!(locked.unlock_self(), "Hey <@U024BE7LH>, see <#C123|general> :wave:");
}

#[test]
fn test_lock_withAmazonMarketplaceId_shouldHideIt() {
    let locked = locker("amazon").lock("Available on ATVPDKIKX0DER only");

    assert_eq!(locked.tokens.len(), 1);
    assert_eq!(locked.tokens[0].1, "ATVPDKIKX0DER");
}

#[test]
fn test_unlock_withTranslatedText_shouldRestoreEveryToken() {
    let locked = locker("generic").lock("Hello {{name}}, open https://example.com/x");
    let translated = locked.text.replace("Hello", "Bonjour").replace("open", "ouvrez");

    assert_eq!(
        locked.unlock(&translated),
        "Bonjour {{name}}, ouvrez https://example.com/x"
    );
}

#[test]
fn test_lock_withNothingToLock_shouldReturnInputUnchanged() {
    let locked = locker("generic").lock("Red shoes");
    assert_eq!(locked.text, "Red shoes");
    assert!(!locked.has_tokens());
}
