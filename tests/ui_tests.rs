//! UI automation tests using egui_kittest and AccessKit
//!
//! The real components are rendered over a widget wired to fakes, then
//! driven through their accessibility labels.

mod common;

use common::Fixture;
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use parley::backend::{BackendCommand, InstructionCatalog};
use parley::messages::{Message, Role};
use parley::ui::components::{ControlBar, InputBar, InstructionPicker, MessageList, VoicePicker};
use parley::ui::Theme;

struct TestApp {
    fx: Fixture,
    theme: Theme,
}

impl TestApp {
    fn new() -> Self {
        Self::from_fixture(Fixture::new())
    }

    fn from_fixture(fx: Fixture) -> Self {
        Self {
            fx,
            theme: Theme::light(),
        }
    }

    fn with_message(self, message: Message) -> Self {
        self.fx.state.transcript.push(message);
        self
    }
}

fn render_chat_ui(ctx: &egui::Context, app: &mut TestApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        InstructionPicker::new(&mut app.fx.state, &app.theme).show(ui);
        VoicePicker::new(&mut app.fx.state, &app.theme).show(ui);
        ControlBar::new(&mut app.fx.state, &app.theme).show(ui);
        InputBar::new(&mut app.fx.state, &app.theme).show(ui);
        ui.separator();
        MessageList::new(&app.fx.state, &app.theme).show(ui);
    });
}

fn harness(app: TestApp) -> Harness<'static, TestApp> {
    Harness::builder()
        .with_size(egui::Vec2::new(480.0, 640.0))
        .build_state(render_chat_ui, app)
}

#[test]
fn test_controls_are_accessible() {
    let mut harness = harness(TestApp::new());
    harness.run();

    let _ = harness.get_by_label("Message input");
    let _ = harness.get_by_label("Send message");
    let _ = harness.get_by_label("Microphone");
    let _ = harness.get_by_label("Speaker");
    let _ = harness.get_by_label("Instruction set");
    let _ = harness.get_by_label("Custom instruction");
    let _ = harness.get_by_label("Voice");
}

#[test]
fn test_type_text_into_input() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Message input").focus();
    harness.run();
    harness.get_by_label("Message input").type_text("Hello, world!");
    harness.run();

    assert_eq!(harness.state().fx.state.input_text, "Hello, world!");
}

#[test]
fn test_send_button_sends_message() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Message input").focus();
    harness.run();
    harness.get_by_label("Message input").type_text("What is 2 + 2?");
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    let app = harness.state();
    let messages = app.fx.state.transcript.get_all();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "What is 2 + 2?");
    assert!(app.fx.state.input_text.is_empty());
    assert!(app.fx.state.loading);

    let chats = app
        .fx
        .drain_commands()
        .into_iter()
        .filter(|c| matches!(c, BackendCommand::Chat { .. }))
        .count();
    assert_eq!(chats, 1);
}

#[test]
fn test_cannot_send_empty_message() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    assert!(harness.state().fx.state.transcript.is_empty());
    assert!(harness.state().fx.drain_commands().is_empty());
}

#[test]
fn test_messages_appear_in_list() {
    let app = TestApp::new()
        .with_message(Message::user("Hello!"))
        .with_message(Message::assistant("Hi, how can I help?"));
    let mut harness = harness(app);
    harness.run();

    let _ = harness.get_by_label("User message: Hello!");
    let _ = harness.get_by_label("Assistant message: Hi, how can I help?");
}

#[test]
fn test_typing_indicator_while_loading() {
    let mut app = TestApp::new();
    app.fx.state.send("anyone there?");
    let mut harness = harness(app);
    harness.run();

    let _ = harness.get_by_label("Typing indicator");
}

#[test]
fn test_mic_button_toggles_listening() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Microphone").click();
    harness.run();
    assert!(harness.state().fx.state.speech_input.is_listening());

    harness.get_by_label("Microphone").click();
    harness.run();
    assert!(!harness.state().fx.state.speech_input.is_listening());
    assert!(harness.state().fx.state.transcript.is_empty());
}

#[test]
fn test_mic_button_disabled_without_recognizer() {
    let mut harness = harness(TestApp::from_fixture(Fixture::without_speech()));
    harness.run();

    harness.get_by_label("Microphone").click();
    harness.run();
    assert!(!harness.state().fx.state.speech_input.is_listening());
}

#[test]
fn test_speaker_button_replays_last_reply() {
    let app = TestApp::new()
        .with_message(Message::user("hi"))
        .with_message(Message::assistant("hello back"));
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Speaker").click();
    harness.run();

    assert!(harness.state().fx.state.speech_output.is_speaking());
    let recorder = harness.state().fx.recorder.lock();
    assert_eq!(recorder.spoken.len(), 1);
    assert_eq!(recorder.spoken[0].text, "hello back");
}

#[test]
fn test_speaker_button_disabled_with_empty_transcript() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Speaker").click();
    harness.run();
    assert!(harness.state().fx.recorder.lock().spoken.is_empty());
}

#[test]
fn test_custom_instruction_accepts_numbers_only() {
    let mut app = TestApp::new();
    app.fx.state.instructions.set_catalog(InstructionCatalog::new(vec![(
        "1".to_string(),
        "General".to_string(),
    )]));
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Custom instruction").focus();
    harness.run();
    harness.get_by_label("Custom instruction").type_text("4a2");
    harness.run();

    let state = &harness.state().fx.state;
    assert_eq!(state.instructions.custom(), "42");
    assert_eq!(state.instructions.active(), "42");
    assert_eq!(state.instructions.selected(), None);
}
