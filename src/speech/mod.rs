pub mod picker;
pub mod quiz;

pub use picker::ShuffleBag;
pub use quiz::{QuizCommentator, QuizOutcome};
