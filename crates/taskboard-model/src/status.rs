// SPDX-License-Identifier: Apache-2.0

wire_enum! {
    ProjectStatus, "project status" {
        New => "NEW",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        OnHold => "ON_HOLD",
    }
}

wire_enum! {
    /// Task lifecycle. `TO_REVIEW` is the hand-off state an assignee moves a
    /// task into; `VERIFIED` and `ARCHIVED` are set by the creator.
    TaskStatus, "task status" {
        Todo => "TODO",
        InProgress => "IN_PROGRESS",
        ToReview => "TO_REVIEW",
        Verified => "VERIFIED",
        Done => "DONE",
        Archived => "ARCHIVED",
    }
}

impl TaskStatus {
    /// Whether an assignee may still hand the task off for review.
    #[must_use]
    pub const fn can_submit_for_review(self) -> bool {
        !matches!(self, Self::ToReview | Self::Verified | Self::Archived)
    }
}

wire_enum! {
    TaskPriority, "task priority" {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_handoff_is_closed_for_terminal_states() {
        assert!(TaskStatus::Todo.can_submit_for_review());
        assert!(TaskStatus::Done.can_submit_for_review());
        assert!(!TaskStatus::ToReview.can_submit_for_review());
        assert!(!TaskStatus::Verified.can_submit_for_review());
        assert!(!TaskStatus::Archived.can_submit_for_review());
    }

    #[test]
    fn serde_uses_canonical_spelling() {
        let json = serde_json::to_string(&TaskPriority::High).expect("serialize");
        assert_eq!(json, "\"HIGH\"");
        let parsed: ProjectStatus = serde_json::from_str("\"on_hold\"").expect("deserialize");
        assert_eq!(parsed, ProjectStatus::OnHold);
        assert!(serde_json::from_str::<TaskStatus>("\"BLOCKED\"").is_err());
    }
}
