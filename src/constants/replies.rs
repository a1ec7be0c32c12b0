/// Local fallbacks used when the generator is unavailable or keeps producing
/// unusable text for a troll reply
pub const TROLL_FALLBACKS: &[&str] = &[
    "Prove it or it didn't happen 🤣",
    "Couldn't prove it, so it's a no 🫵",
    "Big words, zero evidence 🤣",
    "Nobody asked, but thanks for sharing 🫵",
];

/// Local fallbacks for a muted user who keeps writing
pub const MUTE_FALLBACKS: &[&str] = &[
    "Still muted, sit tight 🫵",
    "The mute isn't over yet 🤣",
    "Shh, nobody can hear you 🤫",
    "Muted means muted 🫵",
    "Typing harder won't lift the mute 🤣",
];

/// Fixed lines for reactive-cohort members who get muted
pub const COHORT_MUTE_REPLIES: &[&str] = &[
    "Look who's talking from the penalty box 🫵",
    "😂 Even the mute can't stop you, huh",
    "Write all you want, it's going nowhere 🤣",
    "Your messages are on a little vacation 🫵",
    "Knock knock. Nobody's there 🤣",
];

/// Build the prompt for a troll reply to `text`
pub fn troll_prompt(text: &str) -> String {
    format!(
        "The user wrote: {}\n\
        You are a cheeky troll in a group chat. Answer with ONE short teasing phrase in the style of:\n\
        \"Prove it or it didn't happen 🤣\", \"Couldn't prove it, so it's a no 🫵\", \"Big words, zero evidence\".\n\
        You may use the emoji 🤣 and 🫵.\n\
        Never mention anyone's family, religion or nationality.\n\
        Don't be polite. Don't explain. Just drop the phrase.\n\
        Answer:",
        text
    )
}

/// Build the prompt for a reply to a muted user named `name`
pub fn muted_prompt(name: &str) -> String {
    troll_prompt(&format!("{} keeps writing while muted", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::forbidden::is_forbidden;

    #[test]
    fn test_pools_are_clean() {
        for line in TROLL_FALLBACKS
            .iter()
            .chain(MUTE_FALLBACKS)
            .chain(COHORT_MUTE_REPLIES)
        {
            assert!(!is_forbidden(line), "pool line is forbidden: {}", line);
        }
    }

    #[test]
    fn test_muted_prompt_mentions_name() {
        assert!(muted_prompt("Alice").contains("Alice keeps writing while muted"));
    }
}
