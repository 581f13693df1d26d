// core/tests/controller_properties.rs
//
// Property tests over random key sequences fed to the edit controller.

use proptest::prelude::*;
use semoji_core::{Config, ImeEngine, KeyEvent, MatchPolicy, Matcher, Notification, Vocabulary};
use std::sync::Arc;

fn arb_key() -> impl Strategy<Value = KeyEvent> {
    prop_oneof![
        4 => proptest::char::range('a', 'z').prop_map(KeyEvent::Char),
        1 => Just(KeyEvent::Backspace),
        1 => Just(KeyEvent::Delete),
        1 => Just(KeyEvent::Left),
        1 => Just(KeyEvent::Right),
        1 => Just(KeyEvent::Home),
        1 => Just(KeyEvent::End),
        1 => Just(KeyEvent::Up),
        1 => Just(KeyEvent::Down),
        1 => Just(KeyEvent::PageUp),
        1 => Just(KeyEvent::PageDown),
        1 => Just(KeyEvent::Space),
        1 => Just(KeyEvent::Enter),
        1 => Just(KeyEvent::Escape),
        1 => (0u8..10).prop_map(KeyEvent::Number),
        1 => Just(KeyEvent::Char('.')),
        1 => Just(KeyEvent::FocusOut),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Cursor stays in bounds and every commit leaves an empty session.
    #[test]
    fn prop_controller_invariants(keys in prop::collection::vec(arb_key(), 0..40)) {
        let mut ime = ImeEngine::from_config(Arc::new(Vocabulary::builtin()), Config::default());
        for key in keys {
            ime.process_key(key);
            ime.poll();

            let buffer = ime.session().input_buffer();
            prop_assert!(buffer.cursor() <= buffer.len());
            let candidates = ime.session().candidates();
            prop_assert!(candidates.cursor() < candidates.len().max(1));

            let notes = ime.take_notifications();
            if notes.iter().any(|n| matches!(n, Notification::Commit { .. })) {
                prop_assert!(ime.session().input_buffer().is_empty());
                prop_assert_eq!(ime.session().input_buffer().cursor(), 0);
                prop_assert!(ime.session().candidates().is_empty());
            }
            prop_assert_eq!(ime.context().preedit_text.clone(), ime.session().input_buffer().text());
        }
    }

    /// Keyword policy never returns entries whose keywords miss the query.
    #[test]
    fn prop_keyword_results_contain_query(query in "[a-z]{1,3}") {
        let vocab = Vocabulary::builtin();
        for id in MatchPolicy::Keyword.find(&query, &vocab) {
            let entry = vocab.get(id).unwrap();
            prop_assert!(entry.keywords.iter().any(|k| k.contains(query.as_str())));
        }
    }
}
