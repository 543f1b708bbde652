//! User-facing strings.

use probforge_common::{Locale, Subject};

use crate::workflow::WorkflowState;

#[derive(Debug)]
pub struct Labels {
    pub title: &'static str,
    pub input_heading: &'static str,
    pub result_heading: &'static str,
    pub solution_heading: &'static str,
    pub content_placeholder: &'static str,
    pub result_placeholder: &'static str,
    pub submit: &'static str,
    pub difficulty: &'static str,
    pub math: &'static str,
    pub physics: &'static str,
    pub persisting: &'static str,
    pub generating: &'static str,
    pub done: &'static str,
    pub error: &'static str,
}

static JA: Labels = Labels {
    title: "ProbForge",
    input_heading: "📝 元の問題を入力",
    result_heading: "🤖 生成された類題",
    solution_heading: "解説 / 解答",
    content_placeholder: "ここに問題文を入力してください。",
    result_placeholder: "生成結果がここに表示されます",
    submit: "✨ 類題を生成する",
    difficulty: "難易度",
    math: "数学",
    physics: "物理",
    persisting: "問題を保存中...",
    generating: "AIが類題を生成中...",
    done: "完了",
    error: "エラーが発生しました",
};

static EN: Labels = Labels {
    title: "ProbForge",
    input_heading: "📝 Original problem",
    result_heading: "🤖 Generated problem",
    solution_heading: "Solution",
    content_placeholder: "Enter the problem statement here.",
    result_placeholder: "The generated problem will appear here",
    submit: "✨ Generate a similar problem",
    difficulty: "Difficulty",
    math: "Math",
    physics: "Physics",
    persisting: "Saving problem...",
    generating: "Generating a similar problem...",
    done: "Done",
    error: "Something went wrong",
};

// label sets are statics, identity is enough
impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Labels {}

impl Labels {
    pub fn for_locale(locale: Locale) -> &'static Labels {
        match locale {
            Locale::Ja => &JA,
            Locale::En => &EN,
        }
    }

    pub fn subject(&self, subject: Subject) -> &'static str {
        match subject {
            Subject::Math => self.math,
            Subject::Physics => self.physics,
        }
    }

    /// Localized status for a state; empty when idle.
    pub fn status(&self, state: &WorkflowState) -> &'static str {
        match state {
            WorkflowState::Idle => "",
            WorkflowState::Saving => self.persisting,
            WorkflowState::Generating { .. } => self.generating,
            WorkflowState::Done => self.done,
            WorkflowState::Error => self.error,
        }
    }
}
