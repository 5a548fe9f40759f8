/**
 * Ordering of questions and answers for a session.
 *
 * The session order is always randomized. When the store asks for weighted
 * ordering, a second pass stably sorts the shuffled questions by
 * `random() * correct_count / attempted_count`, so that questions answered
 * reliably correctly drift toward the back and never-attempted or
 * historically-missed questions are seen sooner. Unattempted questions keep a
 * weight of zero, ahead of everything with a positive ratio.
 */
use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

use crate::quiz::{Metadata, Question};

/// Produce the ordered sequence of questions presented in a session: filter
/// out disabled questions, optionally shuffle each question's answers, shuffle
/// the question order, optionally re-sort it by historical weight, and assign
/// letters to every answer.
pub fn organize(questions: Vec<Question>, metadata: &Metadata) -> Vec<Question> {
    let mut rng = thread_rng();
    let mut questions: Vec<Question> =
        questions.into_iter().filter(|q| q.enabled).collect();

    if metadata.shuffle_answers {
        for question in questions.iter_mut() {
            shuffle_answers(question, &mut rng);
        }
    }

    questions.shuffle(&mut rng);

    if metadata.shuffle_questions_by_weight {
        questions = sort_by_weight(questions, &mut rng);
    }

    for question in questions.iter_mut() {
        question.assign_letters();
    }

    questions
}

/// Randomly permute a question's answers and immediately recompute the
/// letters, so that no caller can observe the answers between the two steps.
pub fn shuffle_answers<R: Rng>(question: &mut Question, rng: &mut R) {
    question.answers.shuffle(rng);
    question.assign_letters();
}

/// Stable ascending sort on a weight key computed once per question. The
/// random factor keeps the order from being deterministic across sessions and
/// breaks up questions with identical historical ratios.
fn sort_by_weight<R: Rng>(questions: Vec<Question>, rng: &mut R) -> Vec<Question> {
    let mut keyed: Vec<(f64, Question)> = questions
        .into_iter()
        .map(|q| (weight_key(&q, rng), q))
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(_, q)| q).collect()
}

fn weight_key<R: Rng>(question: &Question, rng: &mut R) -> f64 {
    if question.attempted_count > 0 {
        rng.gen::<f64>() * (question.correct_count as f64 / question.attempted_count as f64)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::quiz::Answer;

    #[test]
    fn unattempted_questions_have_weight_zero() {
        let mut rng = StdRng::seed_from_u64(17);
        let q = question(1, 0, 0);
        assert_eq!(weight_key(&q, &mut rng), 0.0);
    }

    #[test]
    fn weight_key_is_bounded_by_the_historical_ratio() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..100 {
            let q = question(1, 8, 6);
            let key = weight_key(&q, &mut rng);
            assert!(key >= 0.0);
            assert!(key <= 6.0 / 8.0);
        }

        // A question missed every time weighs nothing, like an unseen one.
        let q = question(2, 5, 0);
        assert_eq!(weight_key(&q, &mut rng), 0.0);
    }

    #[test]
    fn disabled_questions_are_excluded() {
        let metadata = plain_metadata();
        let mut disabled = question(2, 0, 0);
        disabled.enabled = false;

        let ordered = organize(vec![question(1, 0, 0), disabled, question(3, 0, 0)], &metadata);
        let ids: Vec<i64> = ordered.iter().map(|q| q.id).collect();
        assert_eq!(ordered.len(), 2);
        assert!(!ids.contains(&2));
    }

    #[test]
    fn unattempted_questions_are_never_dropped_by_weighting() {
        let mut metadata = plain_metadata();
        metadata.shuffle_questions_by_weight = true;

        let questions = vec![question(1, 0, 0), question(2, 10, 10), question(3, 0, 0)];
        let ordered = organize(questions, &metadata);
        assert_eq!(ordered.len(), 3);
    }

    #[test]
    fn organize_assigns_letters_to_every_question() {
        let metadata = plain_metadata();
        let ordered = organize(vec![question(1, 0, 0), question(2, 0, 0)], &metadata);
        for q in ordered.iter() {
            let letters: Vec<char> = q.answers.iter().filter_map(|a| a.letter).collect();
            assert_eq!(letters, vec!['A', 'B', 'C']);
        }
    }

    #[test]
    fn shuffling_answers_recomputes_letters() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut q = question(1, 0, 0);
        for _ in 0..10 {
            shuffle_answers(&mut q, &mut rng);
            let letters: Vec<char> = q.answers.iter().filter_map(|a| a.letter).collect();
            assert_eq!(letters, vec!['A', 'B', 'C']);
        }
    }

    fn plain_metadata() -> Metadata {
        Metadata {
            description: String::from("test"),
            shuffle_answers: false,
            shuffle_questions_by_weight: false,
        }
    }

    fn question(id: i64, attempted: i64, correct: i64) -> Question {
        Question {
            id,
            text: format!("Question {}?", id),
            postmortem: None,
            answers: vec![
                Answer { id: 1, text: String::from("first"), is_correct: true, letter: None },
                Answer { id: 2, text: String::from("second"), is_correct: false, letter: None },
                Answer { id: 3, text: String::from("third"), is_correct: false, letter: None },
            ],
            attempted_count: attempted,
            correct_count: correct,
            enabled: true,
        }
    }
}
