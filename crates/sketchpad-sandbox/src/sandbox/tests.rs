use std::time::Duration;

use super::*;

fn sandbox() -> ScriptSandbox {
    ScriptSandbox::new(SandboxConfig::default().with_timeout(Duration::from_millis(2000)))
}

fn six_by_six() -> ViewportSize {
    ViewportSize::new(6.0, 6.0, "6x6")
}

fn fault_of(outcome: &ExecutionOutcome) -> &ExecutionFault {
    outcome.fault().expect("expected a failed execution")
}

#[tokio::test]
async fn test_circle_renders() {
    let outcome = sandbox()
        .execute("draw.circle(3, 3, 1).fill('red');", &six_by_six())
        .await;
    let markup = outcome.markup().expect("expected success");
    assert!(markup.contains(r#"<circle cx="3" cy="3" r="1" fill="red"/>"#));
}

#[tokio::test]
async fn test_shapes_and_attributes() {
    let script = r#"
draw.rect(0, 0, 6, 6, { fill: 'white' });
draw.line(0, 0, 6, 6).stroke('black', 0.02);
draw.polygon([[1, 1], [2, 1], [1.5, 2]], { fill: 'blue', opacity: 0.5 });
draw.path('M 1 1 L 5 5', { stroke: 'green', strokeWidth: 0.1 });
"#;
    let outcome = sandbox().execute(script, &six_by_six()).await;
    let markup = outcome.markup().expect("expected success");
    assert!(markup.contains(r#"<rect x="0" y="0" width="6" height="6" fill="white"/>"#));
    assert!(markup.contains(r#"stroke="black" stroke-width="0.02""#));
    assert!(markup.contains(r#"points="1,1 2,1 1.5,2" fill="blue" opacity="0.5""#));
    assert!(markup.contains(r#"d="M 1 1 L 5 5" stroke="green" stroke-width="0.1""#));
}

#[tokio::test]
async fn test_capability_bound_to_viewport() {
    let script = r#"
if (draw.width !== 6 || draw.height !== 6) { throw new Error('wrong size'); }
if (draw.pixelWidth !== 576) { throw new Error('wrong pixels'); }
draw.circle(draw.width / 2, draw.height / 2, 1);
"#;
    let outcome = sandbox().execute(script, &six_by_six()).await;
    assert!(outcome.is_success(), "{outcome:?}");
}

#[tokio::test]
async fn test_unterminated_construct_is_compile_fault() {
    let outcome = sandbox().execute("draw.circle(1, 1, 1", &six_by_six()).await;
    let fault = fault_of(&outcome);
    assert_eq!(fault.kind, FaultKind::Compile);
    assert_eq!(fault.line, Some(1));
}

#[tokio::test]
async fn test_syntax_error_line_is_rebased() {
    let script = "draw.circle(1, 1, 1);\nvar a = 1;\nvar = 2;\ndraw.circle(2, 2, 1);";
    let outcome = sandbox().execute(script, &six_by_six()).await;
    let fault = fault_of(&outcome);
    assert_eq!(fault.kind, FaultKind::Compile);
    assert_eq!(fault.line, Some(3));
}

#[tokio::test]
async fn test_throw_before_capability_call_is_compile() {
    let outcome = sandbox()
        .execute("throw new Error('early');\ndraw.circle(1, 1, 1);", &six_by_six())
        .await;
    let fault = fault_of(&outcome);
    assert_eq!(fault.kind, FaultKind::Compile);
    assert!(fault.message.contains("early"));
}

#[tokio::test]
async fn test_throw_after_capability_call_is_execution() {
    let outcome = sandbox()
        .execute("draw.rect(0, 0, 1, 1);\nnull.x;", &six_by_six())
        .await;
    let fault = fault_of(&outcome);
    assert_eq!(fault.kind, FaultKind::Execution);
    assert!(fault.message.starts_with("TypeError"));
}

#[tokio::test]
async fn test_bad_capability_argument_is_execution() {
    let outcome = sandbox()
        .execute("draw.circle('middle', 1, 1);", &six_by_six())
        .await;
    let fault = fault_of(&outcome);
    assert_eq!(fault.kind, FaultKind::Execution);
    assert!(fault.message.contains("cx must be a finite number"));
}

#[tokio::test]
async fn test_async_script_success() {
    let script = "await Promise.resolve();\ndraw.circle(1, 1, 0.5);";
    let outcome = sandbox().execute(script, &six_by_six()).await;
    assert!(outcome.markup().is_some_and(|m| m.contains("<circle")));
}

#[tokio::test]
async fn test_async_rejection_is_captured() {
    let script = "draw.circle(1, 1, 1);\nawait Promise.resolve();\nthrow new RangeError('late');";
    let outcome = sandbox().execute(script, &six_by_six()).await;
    let fault = fault_of(&outcome);
    assert_eq!(fault.kind, FaultKind::Execution);
    assert_eq!(fault.message, "RangeError: late");
}

#[tokio::test]
async fn test_thrown_non_error_value() {
    let outcome = sandbox()
        .execute("draw.clear();\nthrow 'plain string';", &six_by_six())
        .await;
    assert_eq!(fault_of(&outcome).message, "plain string");
}

#[tokio::test]
async fn test_never_settling_script_times_out() {
    let sandbox =
        ScriptSandbox::new(SandboxConfig::default().with_timeout(Duration::from_millis(150)));
    let started = std::time::Instant::now();
    let outcome = sandbox
        .execute("draw.circle(1, 1, 1);\nawait new Promise(function () {});", &six_by_six())
        .await;
    assert_eq!(fault_of(&outcome).kind, FaultKind::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(sandbox.factory().attached_count(), 0);
}

#[test]
fn test_spinning_script_does_not_block_runtime_shutdown() {
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let sandbox =
            ScriptSandbox::new(SandboxConfig::default().with_timeout(Duration::from_millis(200)));
        let outcome = runtime.block_on(
            sandbox.execute("draw.circle(1, 1, 1);\nwhile (true) {}", &six_by_six()),
        );
        drop(runtime);
        let _ = done_tx.send(outcome.fault().map(|fault| fault.kind));
    });

    let kind = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("runtime shutdown waited on the spinning script");
    assert_eq!(kind, Some(FaultKind::Timeout));
}

#[tokio::test]
async fn test_line_written_in_message_is_not_shifted() {
    let script = "draw.circle(1, 1, 1);\ndraw.rect(0, 0, 1, 1);\nthrow new Error('bad value on line 2');";
    let outcome = sandbox().execute(script, &six_by_six()).await;
    let fault = fault_of(&outcome);
    assert_eq!(fault.kind, FaultKind::Execution);
    assert_eq!(fault.line, Some(2));
}

#[tokio::test]
async fn test_loop_limit_turns_spin_into_failure() {
    let sandbox = ScriptSandbox::new(
        SandboxConfig::default()
            .with_timeout(Duration::from_millis(1000))
            .with_loop_iteration_limit(Some(10_000)),
    );
    let outcome = sandbox
        .execute("draw.circle(1, 1, 1);\nwhile (true) {}", &six_by_six())
        .await;
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_every_surface_disposed() {
    let sandbox = sandbox();
    sandbox.execute("draw.circle(1, 1, 1);", &six_by_six()).await;
    sandbox.execute("draw.circle(1, 1", &six_by_six()).await;
    sandbox.execute("draw.circle(1, 1, 1); null.x;", &six_by_six()).await;

    let factory = sandbox.factory();
    assert_eq!(factory.created_count(), 3);
    assert_eq!(factory.disposed_count(), 3);
    assert_eq!(factory.attached_count(), 0);
}

#[tokio::test]
async fn test_no_state_leaks_between_executions() {
    let sandbox = sandbox();
    let first = sandbox
        .execute("globalThis.leak = 1;\nvar other = 2;\ndraw.circle(1, 1, 1);", &six_by_six())
        .await;
    assert!(first.is_success());

    let second = sandbox
        .execute(
            "if (typeof leak !== 'undefined' || typeof other !== 'undefined') { throw new Error('leaked'); }\ndraw.rect(0, 0, 1, 1);",
            &six_by_six(),
        )
        .await;
    let markup = second.markup().expect("expected success");
    assert!(!markup.contains("<circle"));
}

#[tokio::test]
async fn test_globals_isolated() {
    let script = "if (typeof Reflect !== 'undefined') { throw new Error('ambient'); }\ndraw.circle(1, 1, 1);";
    let isolated = sandbox().execute(script, &six_by_six()).await;
    assert!(isolated.is_success(), "{isolated:?}");

    let open = ScriptSandbox::new(SandboxConfig::default().with_isolation(false))
        .execute(script, &six_by_six())
        .await;
    assert!(fault_of(&open).message.contains("ambient"));
}

#[tokio::test]
async fn test_console_output_does_not_fail_script() {
    let script = "console.log('hello', { a: 1 });\nconsole.warn('careful');\ndraw.circle(1, 1, 1);";
    assert!(sandbox().execute(script, &six_by_six()).await.is_success());

    let silent = ScriptSandbox::new(SandboxConfig::default().with_console_capture(false));
    assert!(silent.execute(script, &six_by_six()).await.is_success());
}

#[tokio::test]
async fn test_multibyte_text_survives() {
    let outcome = sandbox()
        .execute("draw.text(1, 1, 'héllo ✓ <b>', { size: 0.5 });", &six_by_six())
        .await;
    let markup = outcome.markup().expect("expected success");
    assert!(markup.contains("héllo ✓ &lt;b&gt;"));
}

#[tokio::test]
async fn test_oversized_script_rejected() {
    let sandbox = ScriptSandbox::new(SandboxConfig::default().with_max_script_bytes(16));
    let outcome = sandbox
        .execute("draw.circle(1, 1, 1); draw.circle(2, 2, 1);", &six_by_six())
        .await;
    assert_eq!(fault_of(&outcome).kind, FaultKind::Compile);
    assert_eq!(sandbox.factory().created_count(), 0);
}

#[tokio::test]
async fn test_invalid_viewport_is_execution_fault() {
    let outcome = sandbox()
        .execute("draw.circle(1, 1, 1);", &ViewportSize::new(0.0, 1.0, "flat"))
        .await;
    assert_eq!(fault_of(&outcome).kind, FaultKind::Execution);
}

#[tokio::test]
async fn test_empty_script_renders_nothing() {
    let outcome = sandbox().execute("", &six_by_six()).await;
    assert_eq!(outcome.markup(), Some(""));
}

#[tokio::test]
async fn test_health_check() {
    assert!(sandbox().health_check().await);
}
