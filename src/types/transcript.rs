use crate::types::{Role, Turn};

/// The ordered, append-only log of turns for one conversation.
///
/// A transcript only ever grows. There is no API to edit, delete, or reorder
/// turns; starting over means constructing a fresh transcript. The order of
/// turns is conversation order and is replayed verbatim as request context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end of the log.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full ordered sequence of turns.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// An owned copy of the full ordered sequence, suitable for building a
    /// request's `messages` array.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Number of turns in the log.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True if no turn has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Iterate over turns in conversation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Count of turns with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
        assert_eq!(transcript.last(), None);
    }

    #[test]
    fn push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("one"));
        transcript.push(Turn::assistant("two"));
        transcript.push(Turn::user("three"));

        let contents: Vec<&str> = transcript.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(transcript.last().unwrap().content, "three");
    }

    #[test]
    fn snapshot_matches_turns() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("Hello"));
        transcript.push(Turn::assistant("Hi there!"));

        let snapshot = transcript.snapshot();
        assert_eq!(snapshot.as_slice(), transcript.turns());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("Hello"));

        let snapshot = transcript.snapshot();
        transcript.push(Turn::assistant("Hi there!"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn count_role() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("a"));
        transcript.push(Turn::assistant("b"));
        transcript.push(Turn::user("c"));

        assert_eq!(transcript.count_role(Role::User), 2);
        assert_eq!(transcript.count_role(Role::Assistant), 1);
    }
}
