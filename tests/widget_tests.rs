//! Chat widget behaviour with fake speech capabilities and an in-process
//! backend channel

mod common;

use common::Fixture;
use parley::backend::{BackendCommand, BackendEvent, ChatReply, InstructionCatalog, SessionId};
use parley::messages::Role;
use parley::speech::{ListeningState, RecognitionEvent, SynthesisEvent};
use parley::ParleyConfig;
use std::time::{Duration, Instant};
use uuid::Uuid;

fn catalog() -> InstructionCatalog {
    InstructionCatalog::new(vec![
        ("1".to_string(), "General".to_string()),
        ("2".to_string(), "Support".to_string()),
    ])
}

fn reply(text: &str, audio_url: Option<&str>) -> ChatReply {
    ChatReply {
        response: text.to_string(),
        audio_url: audio_url.map(str::to_string),
    }
}

/// Id of the single chat command sent since the last drain
fn sent_chat(fx: &Fixture) -> (Uuid, parley::backend::ChatRequest) {
    let chats: Vec<_> = fx
        .drain_commands()
        .into_iter()
        .filter_map(|command| match command {
            BackendCommand::Chat {
                request_id,
                request,
            } => Some((request_id, request)),
            _ => None,
        })
        .collect();
    assert_eq!(chats.len(), 1, "expected exactly one chat request");
    chats.into_iter().next().unwrap()
}

#[test]
fn test_initialize_requests_catalog_and_session_once() {
    let mut fx = Fixture::new();
    fx.state.initialize();
    fx.state.initialize();

    let commands = fx.drain_commands();
    assert_eq!(commands.len(), 2);
    assert!(commands
        .iter()
        .any(|c| matches!(c, BackendCommand::FetchInstructionSets)));
    assert!(commands
        .iter()
        .any(|c| matches!(c, BackendCommand::NewSession)));
}

#[test]
fn test_full_turn_scenario() {
    let mut fx = Fixture::new();
    fx.state.initialize();
    fx.drain_commands();

    fx.push_backend(BackendEvent::InstructionSets(catalog()));
    fx.push_backend(BackendEvent::Session(SessionId("s-1".into())));
    fx.state.poll_events(Instant::now());
    assert_eq!(fx.state.instructions.selected(), Some("1"));
    assert_eq!(fx.state.session_id().map(|s| s.as_str()), Some("s-1"));

    assert!(fx.state.send("hello"));
    let messages = fx.state.transcript.get_all();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "hello");
    assert!(fx.state.loading);

    let (request_id, request) = sent_chat(&fx);
    assert_eq!(request.instruction_id, "1");
    assert_eq!(request.question, "hello");
    assert_eq!(request.session_id, Some(SessionId("s-1".into())));

    fx.push_backend(BackendEvent::ChatReply {
        request_id,
        reply: reply("hi there", None),
    });
    fx.state.poll_events(Instant::now());

    let messages = fx.state.transcript.get_all();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "hi there");
    assert!(!fx.state.loading);

    let recorder = fx.recorder.lock();
    assert_eq!(recorder.spoken.len(), 1);
    assert_eq!(recorder.spoken[0].text, "hi there");
}

#[test]
fn test_blank_input_is_ignored() {
    let mut fx = Fixture::new();
    assert!(!fx.state.send(""));
    assert!(!fx.state.send("   \n\t"));
    assert!(fx.state.transcript.is_empty());
    assert!(!fx.state.loading);
    assert!(fx.drain_commands().is_empty());
}

#[test]
fn test_submit_trims_and_clears_input() {
    let mut fx = Fixture::new();
    fx.state.input_text = "  what time is it?  ".to_string();
    assert!(fx.state.submit());

    assert!(fx.state.input_text.is_empty());
    assert_eq!(fx.state.transcript.get_all()[0].content, "what time is it?");
    let (_, request) = sent_chat(&fx);
    assert_eq!(request.question, "what time is it?");
}

#[test]
fn test_session_is_null_before_it_arrives() {
    let mut fx = Fixture::new();
    fx.state.send("early bird");
    let (_, request) = sent_chat(&fx);
    assert_eq!(request.session_id, None);
    assert_eq!(request.instruction_id, "default");
}

#[test]
fn test_custom_instruction_overrides_selection() {
    let mut fx = Fixture::new();
    fx.push_backend(BackendEvent::InstructionSets(catalog()));
    fx.state.poll_events(Instant::now());

    fx.state.set_custom_instruction("42");
    fx.state.send("use the override");
    let (_, request) = sent_chat(&fx);
    assert_eq!(request.instruction_id, "42");
}

#[test]
fn test_selected_instruction_is_sent() {
    let mut fx = Fixture::new();
    fx.push_backend(BackendEvent::InstructionSets(catalog()));
    fx.state.poll_events(Instant::now());

    fx.state.select_instruction("2");
    fx.state.send("help please");
    let (_, request) = sent_chat(&fx);
    assert_eq!(request.instruction_id, "2");
}

#[test]
fn test_second_send_while_loading_is_ignored() {
    let mut fx = Fixture::new();
    assert!(fx.state.send("first"));
    assert!(!fx.state.send("second"));

    assert_eq!(fx.state.transcript.len(), 1);
    sent_chat(&fx);
}

#[test]
fn test_failed_chat_adds_no_reply() {
    let mut fx = Fixture::new();
    fx.state.send("hello");
    let (request_id, _) = sent_chat(&fx);

    fx.push_backend(BackendEvent::ChatFailed {
        request_id,
        error: "Backend error (500): boom".to_string(),
    });
    fx.state.poll_events(Instant::now());

    assert_eq!(fx.state.transcript.len(), 1);
    assert!(!fx.state.loading);
    assert!(fx.recorder.lock().spoken.is_empty());

    // The widget is usable again
    assert!(fx.state.send("again"));
}

#[test]
fn test_stale_reply_is_ignored() {
    let mut fx = Fixture::new();
    fx.state.send("hello");
    let (request_id, _) = sent_chat(&fx);

    fx.push_backend(BackendEvent::ChatReply {
        request_id: Uuid::new_v4(),
        reply: reply("not for you", None),
    });
    fx.state.poll_events(Instant::now());
    assert_eq!(fx.state.transcript.len(), 1);
    assert!(fx.state.loading);
    assert_eq!(fx.state.pending_request(), Some(request_id));
}

#[test]
fn test_failed_setup_leaves_state_empty() {
    let mut fx = Fixture::new();
    fx.state.initialize();
    fx.push_backend(BackendEvent::InstructionSetsFailed("offline".into()));
    fx.push_backend(BackendEvent::SessionFailed("offline".into()));
    fx.state.poll_events(Instant::now());

    assert!(fx.state.instructions.catalog().is_empty());
    assert!(fx.state.session_id().is_none());
    assert_eq!(fx.state.instructions.active(), "default");
}

#[test]
fn test_audio_url_is_played_instead_of_synthesis() {
    let mut fx = Fixture::new();
    fx.state.send("say it");
    let (request_id, _) = sent_chat(&fx);

    fx.push_backend(BackendEvent::ChatReply {
        request_id,
        reply: reply("spoken reply", Some("/static/audio/7.mp3")),
    });
    fx.state.poll_events(Instant::now());

    let recorder = fx.recorder.lock();
    assert_eq!(
        recorder.played_urls,
        vec!["http://localhost:8000/static/audio/7.mp3".to_string()]
    );
    assert!(recorder.spoken.is_empty());
    drop(recorder);
    assert_eq!(
        fx.state.speech_output.current_audio_url(),
        Some("http://localhost:8000/static/audio/7.mp3")
    );
}

#[test]
fn test_audio_url_and_synthesis_when_configured() {
    let mut config = ParleyConfig::default();
    config.speech.synthesize_with_audio_url = true;
    let mut fx = Fixture::with_config(config);

    fx.state.send("both please");
    let (request_id, _) = sent_chat(&fx);
    fx.push_backend(BackendEvent::ChatReply {
        request_id,
        reply: reply("double", Some("https://cdn.example.com/a.mp3")),
    });
    fx.state.poll_events(Instant::now());

    let recorder = fx.recorder.lock();
    assert_eq!(recorder.played_urls, vec!["https://cdn.example.com/a.mp3".to_string()]);
    assert_eq!(recorder.spoken.len(), 1);
}

#[test]
fn test_mic_toggle_without_results_sends_nothing() {
    let mut fx = Fixture::new();
    fx.state.toggle_listening();
    assert_eq!(fx.state.speech_input.state(), ListeningState::Listening);

    fx.state.toggle_listening();
    assert_eq!(fx.state.speech_input.state(), ListeningState::Idle);

    fx.state.poll_events(Instant::now() + Duration::from_secs(10));
    assert!(fx.state.transcript.is_empty());
    assert!(fx.drain_commands().is_empty());

    let recorder = fx.recorder.lock();
    assert_eq!(recorder.recognizer_starts, 1);
    assert_eq!(recorder.recognizer_stops, 1);
}

#[test]
fn test_recognizer_end_without_speech_returns_to_idle() {
    let mut fx = Fixture::new();
    fx.state.toggle_listening();
    assert!(fx.state.is_busy());

    fx.recorder
        .lock()
        .recognition_events
        .push_back(RecognitionEvent::End);
    fx.state.poll_events(Instant::now());

    assert_eq!(fx.state.speech_input.state(), ListeningState::Idle);
    assert!(!fx.state.is_busy());
    assert_eq!(fx.state.next_deadline(), None);
    assert!(fx.state.transcript.is_empty());
    assert!(fx.drain_commands().is_empty());
    assert_eq!(fx.recorder.lock().recognizer_stops, 1);
}

#[test]
fn test_silence_after_result_sends_transcript_once() {
    let mut fx = Fixture::new();
    let t0 = Instant::now();
    fx.state.toggle_listening();

    fx.push_recognition(&["turn on", " the lights"]);
    fx.state.poll_events(t0);
    assert_eq!(fx.state.input_text, "turn on the lights");
    assert!(fx.state.speech_input.is_listening());

    fx.state.poll_events(t0 + Duration::from_millis(1999));
    assert!(fx.state.transcript.is_empty());

    fx.state.poll_events(t0 + Duration::from_millis(2000));
    assert!(!fx.state.speech_input.is_listening());
    let messages = fx.state.transcript.get_all();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "turn on the lights");
    sent_chat(&fx);

    fx.state.poll_events(t0 + Duration::from_secs(10));
    assert_eq!(fx.state.transcript.len(), 1);
}

#[test]
fn test_new_result_restarts_silence_timer() {
    let mut fx = Fixture::new();
    let t0 = Instant::now();
    fx.state.toggle_listening();

    fx.push_recognition(&["one"]);
    fx.state.poll_events(t0);

    fx.push_recognition(&["one", " two"]);
    fx.state.poll_events(t0 + Duration::from_millis(1500));

    fx.state.poll_events(t0 + Duration::from_millis(2500));
    assert!(fx.state.transcript.is_empty());

    fx.state.poll_events(t0 + Duration::from_millis(3500));
    assert_eq!(fx.state.transcript.get_all()[0].content, "one two");
}

#[test]
fn test_recognition_error_resets_listening() {
    let mut fx = Fixture::new();
    let t0 = Instant::now();
    fx.state.toggle_listening();
    fx.push_recognition(&["half a sen"]);
    fx.state.poll_events(t0);

    fx.recorder
        .lock()
        .recognition_events
        .push_back(RecognitionEvent::Error("no-speech".into()));
    fx.state.poll_events(t0 + Duration::from_millis(100));
    assert!(!fx.state.speech_input.is_listening());

    fx.state.poll_events(t0 + Duration::from_secs(5));
    assert!(fx.state.transcript.is_empty());
}

#[test]
fn test_speaker_toggle_stops_while_speaking() {
    let mut fx = Fixture::new();
    fx.state.send("hi");
    let (request_id, _) = sent_chat(&fx);
    fx.push_backend(BackendEvent::ChatReply {
        request_id,
        reply: reply("hello back", None),
    });
    fx.state.poll_events(Instant::now());
    assert!(fx.state.speech_output.is_speaking());

    fx.state.toggle_speaker();
    assert!(!fx.state.speech_output.is_speaking());
    let recorder = fx.recorder.lock();
    assert_eq!(recorder.cancels, 1);
    assert_eq!(recorder.spoken.len(), 1);
}

#[test]
fn test_speaker_toggle_replays_last_assistant_message() {
    let mut fx = Fixture::new();
    fx.state.send("hi");
    let (request_id, _) = sent_chat(&fx);
    fx.push_backend(BackendEvent::ChatReply {
        request_id,
        reply: reply("hello back", None),
    });
    fx.state.poll_events(Instant::now());

    let first = fx.recorder.lock().spoken[0].id;
    fx.recorder
        .lock()
        .synthesis_events
        .push_back(SynthesisEvent::Finished(first));
    fx.state.poll_events(Instant::now());
    assert!(!fx.state.speech_output.is_speaking());

    // A newer user message does not change what gets replayed
    fx.state.transcript.push(parley::messages::Message::user("ignored"));
    fx.state.toggle_speaker();

    let recorder = fx.recorder.lock();
    assert_eq!(recorder.spoken.len(), 2);
    assert_eq!(recorder.spoken[1].text, "hello back");
}

#[test]
fn test_selected_voice_reaches_synthesizer() {
    let mut fx = Fixture::new();
    assert!(fx
        .state
        .speech_output
        .voices_mut()
        .select("en_GB-alba-medium"));

    fx.state.send("hi");
    let (request_id, _) = sent_chat(&fx);
    fx.push_backend(BackendEvent::ChatReply {
        request_id,
        reply: reply("cheerio", None),
    });
    fx.state.poll_events(Instant::now());

    let recorder = fx.recorder.lock();
    assert_eq!(recorder.spoken[0].voice.as_deref(), Some("en_GB-alba-medium"));
}

#[test]
fn test_widget_works_without_speech() {
    let mut fx = Fixture::without_speech();
    fx.state.toggle_listening();
    assert!(!fx.state.speech_input.is_listening());

    fx.state.send("typed only");
    let (request_id, _) = sent_chat(&fx);
    fx.push_backend(BackendEvent::ChatReply {
        request_id,
        reply: reply("ok", Some("/a.mp3")),
    });
    fx.state.poll_events(Instant::now());

    assert_eq!(fx.state.transcript.len(), 2);
    assert!(!fx.state.speech_output.is_speaking());
    assert!(!fx.state.is_busy());
}

#[test]
fn test_next_deadline_follows_debounce() {
    let mut fx = Fixture::new();
    let t0 = Instant::now();
    assert!(fx.state.next_deadline().is_none());

    fx.state.toggle_listening();
    fx.push_recognition(&["hey"]);
    fx.state.poll_events(t0);
    assert_eq!(fx.state.next_deadline(), Some(t0 + Duration::from_secs(2)));
    assert!(fx.state.is_busy());
}
