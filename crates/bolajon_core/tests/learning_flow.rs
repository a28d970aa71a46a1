use bolajon_core::db::{open_db, open_db_in_memory};
use bolajon_core::{
    Achievement, AttemptRequest, LearningService, LearningServiceError, UserService,
    ValidationError,
};
use rusqlite::Connection;
use std::thread;
use uuid::Uuid;

fn create_learner(conn: &mut Connection, name: &str) -> Uuid {
    UserService::new(conn).create_user(name, 6).unwrap().id
}

fn attempt(user_id: Uuid, letter_index: u32, is_correct: bool, accuracy: f64) -> AttemptRequest {
    AttemptRequest {
        is_correct: Some(is_correct),
        word: "Anor".to_string(),
        ..AttemptRequest::from_transcript(user_id, letter_index, "", accuracy)
    }
}

#[test]
fn three_correct_attempts_complete_a_letter_and_update_stats() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_learner(&mut conn, "Ali");
    let mut service = LearningService::new(&mut conn);

    let first = service.record_attempt(&attempt(user_id, 0, true, 80.0)).unwrap();
    assert_eq!(first.progress.words_completed, 1);
    assert_eq!(first.progress.accuracy, 80.0);
    assert_eq!(first.score, 80);
    assert_eq!(first.stats.total_stars, 8);
    assert_eq!(first.stats.current_level, 0);
    assert!(first.new_achievements.is_empty());

    let second = service.record_attempt(&attempt(user_id, 0, true, 100.0)).unwrap();
    assert_eq!(second.progress.words_completed, 2);
    assert_eq!(second.progress.accuracy, 90.0);

    let third = service.record_attempt(&attempt(user_id, 0, true, 60.0)).unwrap();
    assert_eq!(third.progress.words_completed, 3);
    assert_eq!(third.progress.accuracy, 80.0);
    assert_eq!(third.progress.attempts_count, 3);
    assert!(third.progress.completed_at.is_some());
    assert_eq!(third.stats.total_score, 240);
    assert_eq!(third.stats.total_stars, 24);
    assert_eq!(third.stats.current_level, 1);
    assert_eq!(third.new_achievements, vec![Achievement::FirstLetter]);

    let stored = service.list_progress(user_id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], third.progress);
}

#[test]
fn incorrect_attempt_counts_but_scores_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_learner(&mut conn, "Lola");
    let mut service = LearningService::new(&mut conn);

    let receipt = service.record_attempt(&attempt(user_id, 3, false, 95.0)).unwrap();
    assert!(!receipt.is_correct);
    assert_eq!(receipt.score, 0);
    assert_eq!(receipt.progress.words_completed, 0);
    assert_eq!(receipt.progress.attempts_count, 1);
    assert_eq!(receipt.progress.letter, "E");
    assert_eq!(receipt.stats.total_stars, 0);
    assert_eq!(receipt.stats.total_score, 0);
}

#[test]
fn correctness_is_derived_from_transcript_when_not_supplied() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_learner(&mut conn, "Vali");
    let mut service = LearningService::new(&mut conn);

    let matched = service
        .record_attempt(&AttemptRequest::from_transcript(user_id, 26, "shamol", 70.0))
        .unwrap();
    assert!(matched.is_correct);
    assert_eq!(matched.score, 70);

    let missed = service
        .record_attempt(&AttemptRequest::from_transcript(user_id, 26, "salom", 70.0))
        .unwrap();
    assert!(!missed.is_correct);
    assert_eq!(missed.progress.words_completed, 1);
    assert_eq!(missed.progress.attempts_count, 2);
}

#[test]
fn sessions_are_logged_newest_first_with_speech_fallback() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_learner(&mut conn, "Aziz");
    let mut service = LearningService::new(&mut conn);

    service.record_attempt(&attempt(user_id, 0, true, 50.0)).unwrap();
    let spoken = AttemptRequest {
        ai_feedback: "Barakalla".to_string(),
        duration_ms: 1_200,
        ..AttemptRequest::from_transcript(user_id, 0, "archa", 90.0)
    };
    let receipt = service.record_attempt(&spoken).unwrap();

    let sessions = service.list_sessions(user_id, None).unwrap();
    assert_eq!(sessions.len(), 2);
    let newest = sessions
        .iter()
        .find(|session| session.id == receipt.session_id)
        .expect("session stored");
    assert_eq!(newest.user_speech, "archa");
    assert_eq!(newest.ai_feedback, "Barakalla");
    assert_eq!(newest.duration_ms, 1_200);
    assert_eq!(newest.score, 90);
    assert_eq!(newest.letter, "A");

    let oldest = sessions
        .iter()
        .find(|session| session.id != receipt.session_id)
        .expect("first session stored");
    assert_eq!(oldest.user_speech, "Anor");

    assert_eq!(service.list_sessions(user_id, Some(1)).unwrap().len(), 1);
}

#[test]
fn invalid_attempts_write_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_learner(&mut conn, "Nodira");
    let mut service = LearningService::new(&mut conn);

    let err = service
        .record_attempt(&attempt(user_id, 29, true, 50.0))
        .unwrap_err();
    assert!(matches!(
        err,
        LearningServiceError::Validation(ValidationError::UnknownLetterIndex(29))
    ));

    let err = service
        .record_attempt(&attempt(user_id, 0, true, 100.5))
        .unwrap_err();
    assert!(matches!(err, LearningServiceError::Validation(_)));

    let ghost = Uuid::new_v4();
    let err = service.record_attempt(&attempt(ghost, 0, true, 50.0)).unwrap_err();
    assert!(matches!(err, LearningServiceError::UserNotFound(id) if id == ghost));

    assert!(service.list_progress(user_id).unwrap().is_empty());
    assert!(service.list_sessions(user_id, None).unwrap().is_empty());
}

#[test]
fn level_tracks_completed_letters_across_graphemes() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_learner(&mut conn, "Sardor");
    let mut service = LearningService::new(&mut conn);

    let mut last = None;
    for letter_index in 0..5 {
        for _ in 0..3 {
            last = Some(
                service
                    .record_attempt(&attempt(user_id, letter_index, true, 100.0))
                    .unwrap(),
            );
        }
    }
    let last = last.expect("attempts recorded");
    assert_eq!(last.stats.current_level, 5);
    assert_eq!(last.new_achievements, vec![Achievement::FiveLetters]);
    assert_eq!(last.stats.total_stars, 150);

    let progress = service.list_progress(user_id).unwrap();
    let indexes = progress.iter().map(|item| item.letter_index).collect::<Vec<_>>();
    assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
}

#[test]
fn concurrent_attempts_from_separate_connections_are_not_lost() {
    const WRITERS: u32 = 6;
    const ATTEMPTS_PER_WRITER: u32 = 10;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bolajon.sqlite3");
    let user_id = create_learner(&mut open_db(&path).unwrap(), "Kamola");

    let accuracy_for = |writer: u32, round: u32| f64::from(10 * (1 + (writer + round) % 10));

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let path = &path;
            scope.spawn(move || {
                let mut conn = open_db(path).unwrap();
                let mut service = LearningService::new(&mut conn);
                for round in 0..ATTEMPTS_PER_WRITER {
                    let letter_index = round % 2;
                    service
                        .record_attempt(&attempt(
                            user_id,
                            letter_index,
                            true,
                            accuracy_for(writer, round),
                        ))
                        .unwrap();
                }
            });
        }
    });

    let expected_score: u32 = (0..WRITERS)
        .flat_map(|writer| (0..ATTEMPTS_PER_WRITER).map(move |round| (writer, round)))
        .map(|(writer, round)| accuracy_for(writer, round) as u32)
        .sum();

    let mut conn = open_db(&path).unwrap();
    let profile = UserService::new(&mut conn).get_profile(user_id).unwrap();
    assert_eq!(profile.user.stats.total_score, expected_score);
    assert_eq!(profile.user.stats.total_stars, expected_score / 10);
    assert_eq!(profile.user.stats.current_level, 2);

    let attempts: u32 = profile
        .progress
        .iter()
        .map(|progress| progress.attempts_count)
        .sum();
    assert_eq!(attempts, WRITERS * ATTEMPTS_PER_WRITER);
    assert!(profile
        .progress
        .iter()
        .all(|progress| progress.attempts_count == WRITERS * ATTEMPTS_PER_WRITER / 2));

    let sessions = LearningService::new(&mut conn)
        .list_sessions(user_id, Some(100))
        .unwrap();
    assert_eq!(sessions.len() as u32, WRITERS * ATTEMPTS_PER_WRITER);
}

#[test]
fn level_is_recounted_after_progress_rows_change_out_of_band() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = create_learner(&mut conn, "Nodira");

    {
        let mut service = LearningService::new(&mut conn);
        for letter_index in [0, 1] {
            for _ in 0..3 {
                service
                    .record_attempt(&attempt(user_id, letter_index, true, 100.0))
                    .unwrap();
            }
        }
    }

    conn.execute(
        "DELETE FROM progress WHERE user_id = ?1 AND letter_index = 0;",
        [user_id.to_string()],
    )
    .unwrap();
    let receipt = LearningService::new(&mut conn)
        .record_attempt(&attempt(user_id, 2, false, 50.0))
        .unwrap();
    assert_eq!(receipt.stats.current_level, 1);

    conn.execute(
        "UPDATE progress
         SET words_completed = total_words, completed_at = 1
         WHERE user_id = ?1 AND letter_index = 2;",
        [user_id.to_string()],
    )
    .unwrap();
    let receipt = LearningService::new(&mut conn)
        .record_attempt(&attempt(user_id, 3, false, 50.0))
        .unwrap();
    assert_eq!(receipt.stats.current_level, 2);
}
