use pretty_assertions::assert_eq;
use sentinel_core::{
    update, AgentStatus, AppState, ChangeStatus, Effect, Msg, ProposedChange, TimerKind,
    SAVE_RESET_DELAY, STATUS_RESET_DELAY,
};

fn init_logging() {
    sentinel_logging::initialize_for_tests();
}

fn change(name: &str) -> ProposedChange {
    ProposedChange {
        file_name: name.to_string(),
        original_code: format!("// original code for {name}"),
        fixed_code: format!("// fixed code for {name}"),
        status: ChangeStatus::Modified,
    }
}

fn with_proposals(names: &[&str]) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::InstructionChanged("Convert to dark mode".to_string()),
    );
    let (state, _) = update(state, Msg::BatchFixRequested);
    let (state, _) = update(
        state,
        Msg::BatchFixCompleted(names.iter().map(|name| change(name)).collect()),
    );
    state
}

#[test]
fn batch_fix_requires_instruction() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::BatchFixRequested);
    assert!(effects.is_empty());
    assert_eq!(state.agent_status(), AgentStatus::Idle);

    let (state, _) = update(state, Msg::InstructionChanged("   ".to_string()));
    let (_, effects) = update(state, Msg::BatchFixRequested);
    assert!(effects.is_empty());
}

#[test]
fn batch_fix_emits_request_with_instruction() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::InstructionChanged("Fix accessibility".to_string()),
    );
    assert!(state.view().can_fix_project);

    let (state, effects) = update(state, Msg::BatchFixRequested);

    assert_eq!(
        effects,
        vec![Effect::FixProject {
            folder_path: ".".to_string(),
            instruction: "Fix accessibility".to_string(),
        }]
    );
    assert!(state.is_scanning());
    assert!(!state.view().can_fix_project);
    assert_eq!(
        state.logs().last().map(String::as_str),
        Some("Instruction: \"Fix accessibility\"")
    );
}

#[test]
fn batch_fix_completion_stores_changes() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::InstructionChanged("Refactor".to_string()),
    );
    let (state, _) = update(state, Msg::BatchFixRequested);
    let (state, effects) = update(
        state,
        Msg::BatchFixCompleted(vec![change("App.tsx"), change("utils.ts")]),
    );

    assert_eq!(state.view().pending_changes, vec!["App.tsx", "utils.ts"]);
    assert!(!state.is_scanning());
    assert_eq!(state.agent_status(), AgentStatus::Success);
    assert!(state
        .logs()
        .contains(&"Analysis complete. 2 modifications proposed.".to_string()));
    assert_eq!(
        effects,
        vec![Effect::StartTimer {
            kind: TimerKind::StatusReset,
            delay: STATUS_RESET_DELAY,
        }]
    );
}

#[test]
fn batch_fix_failure_aborts() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::InstructionChanged("x".to_string()));
    let (state, _) = update(state, Msg::BatchFixRequested);
    let (state, effects) = update(state, Msg::BatchFixFailed("500".to_string()));

    assert!(effects.is_empty());
    assert!(!state.is_scanning());
    assert_eq!(state.agent_status(), AgentStatus::Error);
}

#[test]
fn accepting_a_review_removes_the_change() {
    init_logging();
    let state = with_proposals(&["App.tsx", "Sidebar.tsx"]);

    let (state, _) = update(
        state,
        Msg::ReviewOpened {
            file_name: "Sidebar.tsx".to_string(),
        },
    );
    assert!(state.is_review_mode());
    let review = state.view().review.expect("review open");
    assert_eq!(review.fixed_code, "// fixed code for Sidebar.tsx");

    let (state, _) = update(state, Msg::ReviewAccepted);

    assert!(!state.is_review_mode());
    assert_eq!(state.view().pending_changes, vec!["App.tsx"]);
    assert_eq!(
        state.logs().last().map(String::as_str),
        Some("Accepted changes for Sidebar.tsx")
    );
}

#[test]
fn rejecting_a_review_removes_the_change() {
    init_logging();
    let state = with_proposals(&["App.tsx"]);
    let (state, _) = update(
        state,
        Msg::ReviewOpened {
            file_name: "App.tsx".to_string(),
        },
    );
    let (state, _) = update(state, Msg::ReviewRejected);

    assert!(state.proposed_changes().is_empty());
    assert_eq!(
        state.logs().last().map(String::as_str),
        Some("Rejected changes for App.tsx")
    );
}

#[test]
fn unknown_review_target_is_ignored() {
    init_logging();
    let state = with_proposals(&["App.tsx"]);
    let before = state.clone();
    let (state, _) = update(
        state,
        Msg::ReviewOpened {
            file_name: "missing.ts".to_string(),
        },
    );
    assert_eq!(state, before);

    let (state, _) = update(state, Msg::ReviewAccepted);
    assert_eq!(state.proposed_changes().len(), 1);
}

#[test]
fn analyze_with_fix_reveals_and_autosaves() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::EditorChanged("export default function Page() {}".to_string()),
    );
    let (state, effects) = update(state, Msg::AnalyzeRequested);
    assert_eq!(
        effects,
        vec![Effect::Analyze {
            code: "export default function Page() {}".to_string(),
            file_name: "DemoPage.tsx".to_string(),
            image: None,
        }]
    );

    let fixed = "export default function Page() { return null; }".to_string();
    let (state, effects) = update(
        state,
        Msg::AnalyzeCompleted {
            fixed_code: Some(fixed.clone()),
            explanations: "returns null".to_string(),
        },
    );

    assert_eq!(state.editor_code(), fixed);
    assert_eq!(state.agent_status(), AgentStatus::Success);
    assert!(effects.contains(&Effect::RevealCode {
        text: fixed.clone()
    }));
    assert!(effects.contains(&Effect::SaveFile {
        path: "src/app/DemoPage.tsx".to_string(),
        content: fixed,
        auto: true,
    }));

    let (state, _) = update(
        state,
        Msg::SaveCompleted {
            path: "src/app/DemoPage.tsx".to_string(),
            auto: true,
        },
    );
    assert!(state.logs().last().unwrap().starts_with("AI: Code optimization applied"));
}

#[test]
fn analyze_with_screenshot_sends_image() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::ScreenshotAttached("data:image/png;base64,AAAA".to_string()),
    );
    let (state, effects) = update(state, Msg::AnalyzeRequested);

    assert_eq!(
        state.logs().last().map(String::as_str),
        Some("ANALYZING PIXELS...")
    );
    match &effects[..] {
        [Effect::Analyze { image, .. }] => {
            assert_eq!(image.as_deref(), Some("data:image/png;base64,AAAA"))
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn analyze_without_fix_goes_idle() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::AnalyzeRequested);
    let before_code = state.editor_code().to_string();
    let (state, effects) = update(
        state,
        Msg::AnalyzeCompleted {
            fixed_code: None,
            explanations: String::new(),
        },
    );

    assert_eq!(state.agent_status(), AgentStatus::Idle);
    assert_eq!(state.editor_code(), before_code);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::RevealCode { .. })));
}

#[test]
fn manual_save_round_trip() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::SaveRequested);
    assert!(state.is_saving());
    match &effects[..] {
        [Effect::SaveFile { path, auto, .. }] => {
            assert_eq!(path, "src/app/DemoPage.tsx");
            assert!(!auto);
        }
        other => panic!("unexpected effects: {other:?}"),
    }

    // A second click while saving does nothing.
    let (state, effects) = update(state, Msg::SaveRequested);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::SaveCompleted {
            path: "src/app/DemoPage.tsx".to_string(),
            auto: false,
        },
    );
    assert!(!state.is_saving());
    assert_eq!(state.agent_status(), AgentStatus::Success);
    assert_eq!(
        effects,
        vec![Effect::StartTimer {
            kind: TimerKind::StatusReset,
            delay: SAVE_RESET_DELAY,
        }]
    );
}

#[test]
fn manual_save_failure_sets_error() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SaveRequested);
    let (state, _) = update(
        state,
        Msg::SaveFailed {
            message: "403".to_string(),
            auto: false,
        },
    );

    assert!(!state.is_saving());
    assert_eq!(state.agent_status(), AgentStatus::Error);
    assert_eq!(
        state.logs().last().map(String::as_str),
        Some("Error: Write access denied.")
    );
}
