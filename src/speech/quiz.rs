use serde::{Deserialize, Serialize};

use super::ShuffleBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizOutcome {
    Perfect,
    Partial,
    Incorrect,
}

impl QuizOutcome {
    pub fn from_score(correct: usize, total: usize) -> Self {
        if total > 0 && correct >= total {
            QuizOutcome::Perfect
        } else if correct > 0 {
            QuizOutcome::Partial
        } else {
            QuizOutcome::Incorrect
        }
    }
}

const PERFECT: [&str; 5] = [
    "Oh, you got it right? You want a medal or something?",
    "Congratulations! You must be so proud... of answering a quiz question.",
    "Wow, you did it! Now go do something actually challenging.",
    "You got it right, big deal. Let's not get carried away.",
    "Perfect score, huh? Enjoy your moment of glory, it's not lasting long.",
];

const PARTIAL: [&str; 5] = [
    "Almost there... but not quite. Story of your life, huh?",
    "Half right? So close, yet so far. Keep trying, maybe you'll get it one day.",
    "Some of it was right, but seriously, you can do better than that.",
    "You're halfway there! But no, that doesn't count as winning.",
    "Partial credit? I mean, do you want a participation trophy or what?",
];

const INCORRECT: [&str; 5] = [
    "Wow. How did you manage to get that wrong? Even my dog knows that one.",
    "Not a single answer right? Impressive... in all the wrong ways.",
    "Oh, you really went for zero, huh? Bold strategy. Let's see how it works out.",
    "All wrong? I didn't even think that was possible with how easy these questions are. And yet, here we are.",
    "You do realize that you are meant to select the correct answers, right?",
];

/// Picks the robot's reply to a quiz result. One choice sequence is shared by
/// all outcomes, so consecutive replies never reuse the same slot.
#[derive(Debug, Clone)]
pub struct QuizCommentator {
    choices: ShuffleBag<usize>,
}

impl QuizCommentator {
    pub fn new() -> Self {
        Self {
            choices: ShuffleBag::new((0..PERFECT.len()).collect()),
        }
    }

    pub fn line(&mut self, outcome: QuizOutcome) -> &'static str {
        let choice = self.choices.next_item().unwrap_or(0);
        let lines = match outcome {
            QuizOutcome::Perfect => &PERFECT,
            QuizOutcome::Partial => &PARTIAL,
            QuizOutcome::Incorrect => &INCORRECT,
        };
        lines[choice]
    }
}

impl Default for QuizCommentator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_from_score() {
        assert_eq!(QuizOutcome::from_score(3, 3), QuizOutcome::Perfect);
        assert_eq!(QuizOutcome::from_score(1, 3), QuizOutcome::Partial);
        assert_eq!(QuizOutcome::from_score(0, 3), QuizOutcome::Incorrect);
        assert_eq!(QuizOutcome::from_score(0, 0), QuizOutcome::Incorrect);
    }

    #[test]
    fn lines_come_from_the_matching_outcome() {
        let mut commentator = QuizCommentator::new();
        assert_eq!(commentator.line(QuizOutcome::Perfect), PERFECT[0]);
        assert_eq!(commentator.line(QuizOutcome::Incorrect), INCORRECT[1]);

        for _ in 0..20 {
            assert!(PARTIAL.contains(&commentator.line(QuizOutcome::Partial)));
        }
    }
}
