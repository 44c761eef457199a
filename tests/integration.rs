use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use taskdeck::app::{ActiveDialog, App, Message, TaskFormState};
use taskdeck::display::{FilterSpec, PriorityFilter, SortKey, StatusFilter, display_list};
use taskdeck::settings::Settings;
use taskdeck::store::{StoreConfig, StoreError, TaskStore};
use taskdeck::types::{Priority, Task, TaskStatus};
use taskdeck::window::ListWindow;
use tuirealm::event::{Key, KeyEvent, KeyModifiers};

fn task(title: &str, priority: Priority, status: TaskStatus, created_day: u32) -> Task {
    let created = Utc
        .with_ymd_and_hms(2024, 3, created_day, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        priority,
        status,
        deadline: None,
        time_estimate: None,
        tags: Vec::new(),
        created_at: created,
        updated_at: created,
    }
}

#[test]
fn integration_test_display_pipeline_full_flow() {
    let mut tasks = vec![
        task("Ship release", Priority::Critical, TaskStatus::Active, 1),
        task("Write docs", Priority::Low, TaskStatus::Active, 2),
        task("Fix login bug", Priority::High, TaskStatus::Completed, 3),
        task("Review budget", Priority::Medium, TaskStatus::Active, 4),
    ];
    tasks[1].description = Some("Document the release process".to_string());

    // Default view: everything, newest first.
    let all = display_list(&tasks, &FilterSpec::default(), "", SortKey::default());
    assert_eq!(
        all.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        vec!["Review budget", "Fix login bug", "Write docs", "Ship release"]
    );

    // Status filter drops the completed task.
    let active = display_list(
        &tasks,
        &FilterSpec {
            status: StatusFilter::Active,
            priority: PriorityFilter::All,
        },
        "",
        SortKey::default(),
    );
    assert_eq!(active.len(), 3);
    assert!(active.iter().all(|t| t.status == TaskStatus::Active));

    // Search matches descriptions too, case-insensitively.
    let searched = display_list(&tasks, &FilterSpec::default(), "RELEASE", SortKey::default());
    assert_eq!(
        searched.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        vec!["Write docs", "Ship release"]
    );

    // Priority sort ranks critical before low; search composes with sort.
    let by_priority = display_list(&tasks, &FilterSpec::default(), "", SortKey::Priority);
    assert_eq!(by_priority[0].title, "Ship release");
    assert_eq!(by_priority[3].title, "Write docs");
}

#[test]
fn integration_test_window_tracks_display_list() {
    let tasks: Vec<Task> = (1..=28)
        .map(|day| {
            let status = if day % 2 == 0 {
                TaskStatus::Completed
            } else {
                TaskStatus::Active
            };
            task(&format!("task {day}"), Priority::Medium, status, day)
        })
        .collect();

    let mut window = ListWindow::new(3, 2);
    window.set_viewport_height(12);

    let all = display_list(&tasks, &FilterSpec::default(), "", SortKey::default());
    window.set_count(all.len());
    window.scroll_to_row(all.len() - 1);
    assert_eq!(window.scroll_offset(), window.total_height() - 12);

    // Filtering shrinks the list; the clamped offset must still expose a
    // valid range.
    let active = display_list(
        &tasks,
        &FilterSpec {
            status: StatusFilter::Active,
            priority: PriorityFilter::All,
        },
        "",
        SortKey::default(),
    );
    window.set_count(active.len());
    let range = window.visible_range();
    assert!(range.end <= active.len());
    assert!(!range.is_empty());

    // An emptied list produces an empty range, never a panic.
    window.set_count(0);
    assert_eq!(window.visible_range(), 0..0);
    assert_eq!(window.total_height(), 0);
}

struct StubServer {
    port: u16,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StubServer {
    /// Serves queued canned responses, one per connection, then answers
    /// 404 when the queue runs dry.
    fn start(responses: Vec<String>) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let port = listener.local_addr()?.port();
        listener.set_nonblocking(true)?;

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));

        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                match listener.accept() {
                    Ok((mut stream, _)) => {
                        let _ = stream.set_read_timeout(Some(Duration::from_millis(200)));
                        let mut request = [0u8; 4096];
                        let _ = stream.read(&mut request);
                        let response = queue
                            .lock()
                            .expect("response queue lock should not be poisoned")
                            .pop_front()
                            .unwrap_or_else(|| {
                                json_response("404 Not Found", r#"{"message":"exhausted"}"#)
                            });
                        let _ = stream.write_all(response.as_bytes());
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            stop,
            handle: Some(handle),
        })
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/v1", self.port)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn json_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn remote_task_json(id: Uuid, title: &str, priority: u8, is_completed: bool) -> String {
    format!(
        r#"{{
            "id": "{id}",
            "title": "{title}",
            "priority": {priority},
            "is_completed": {is_completed},
            "created_at": "2024-03-01T12:00:00Z",
            "updated_at": "2024-03-01T12:00:00Z"
        }}"#
    )
}

fn page_json(items: &[String]) -> String {
    format!(
        r#"{{"items": [{}], "total": {}, "page": 1, "page_size": 100, "pages": 1}}"#,
        items.join(","),
        items.len()
    )
}

#[tokio::test]
async fn integration_test_store_lifecycle_against_stub_server() -> Result<()> {
    let id = Uuid::new_v4();
    let server = StubServer::start(vec![
        json_response(
            "200 OK",
            &page_json(&[remote_task_json(id, "Ship release", 0, false)]),
        ),
        json_response("200 OK", &remote_task_json(id, "Ship release", 0, true)),
        json_response(
            "200 OK",
            &page_json(&[remote_task_json(id, "Ship release", 0, true)]),
        ),
    ])?;

    let store = TaskStore::new(StoreConfig {
        base_url: server.base_url(),
        bearer_token: Some("test-token".to_string()),
        request_timeout: Duration::from_millis(1000),
    })?;

    let tasks = store.fetch_all().await?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Active);
    assert!(store.cached().is_some());
    let generation = store.generation();

    // A successful toggle invalidates the cache.
    let toggled = store.toggle_status(id, TaskStatus::Completed).await?;
    assert_eq!(toggled.status, TaskStatus::Completed);
    assert!(store.cached().is_none());
    assert!(store.generation() > generation);

    let refetched = store.fetch_all().await?;
    assert_eq!(refetched[0].status, TaskStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn integration_test_store_auth_failure_has_no_cache_side_effects() -> Result<()> {
    let server = StubServer::start(vec![json_response(
        "401 Unauthorized",
        r#"{"message":"token expired"}"#,
    )])?;

    let store = TaskStore::new(StoreConfig {
        base_url: server.base_url(),
        bearer_token: Some("stale-token".to_string()),
        request_timeout: Duration::from_millis(1000),
    })?;

    let err = store.fetch_all().await.expect_err("fetch should fail");
    match err {
        StoreError::Auth { reason } => assert_eq!(reason, "token expired"),
        other => bail!("expected auth error, got {other:?}"),
    }
    assert!(store.cached().is_none());
    Ok(())
}

fn settings_for(server: &StubServer) -> Settings {
    Settings {
        api_base_url: server.base_url(),
        token: Some("test-token".to_string()),
        request_timeout_ms: 1000,
        ..Settings::default()
    }
}

async fn drain_until<F>(app: &mut App, mut done: F) -> Result<()>
where
    F: FnMut(&App) -> bool,
{
    for _ in 0..50 {
        app.update(Message::Tick)?;
        if done(app) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    bail!("condition not reached before deadline");
}

fn key(code: Key) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

#[tokio::test]
async fn integration_test_app_startup_loads_and_filters() -> Result<()> {
    let server = StubServer::start(vec![json_response(
        "200 OK",
        &page_json(&[
            remote_task_json(Uuid::new_v4(), "Ship release", 0, false),
            remote_task_json(Uuid::new_v4(), "Write docs", 3, true),
        ]),
    )])?;

    let mut app = App::new(settings_for(&server))?;
    drain_until(&mut app, |app| app.loaded).await?;

    assert!(app.fetch_error.is_none());
    assert_eq!(app.tasks.len(), 2);
    assert_eq!(app.display.len(), 2);

    // Cycle the status filter to active-only.
    app.update(key(Key::Char('f')))?;
    assert_eq!(app.display.len(), 1);
    assert_eq!(app.display[0].title, "Ship release");
    Ok(())
}

#[tokio::test]
async fn integration_test_app_surfaces_fetch_error_and_recovers() -> Result<()> {
    // First fetch hits a dead port, the retry hits a live stub.
    let dead = TcpListener::bind(("127.0.0.1", 0))?;
    let dead_port = dead.local_addr()?.port();
    drop(dead);

    let mut settings = Settings {
        api_base_url: format!("http://127.0.0.1:{dead_port}/api/v1"),
        token: Some("test-token".to_string()),
        request_timeout_ms: 500,
        ..Settings::default()
    };

    let mut app = App::new(settings.clone())?;
    drain_until(&mut app, |app| app.fetch_error.is_some()).await?;
    assert!(app.tasks.is_empty());

    // Point the same app at a live server by rebuilding it, as a user
    // would after fixing their config.
    let server = StubServer::start(vec![json_response(
        "200 OK",
        &page_json(&[remote_task_json(Uuid::new_v4(), "Back online", 1, false)]),
    )])?;
    settings.api_base_url = server.base_url();
    let mut app = App::new(settings)?;
    drain_until(&mut app, |app| app.loaded && app.fetch_error.is_none()).await?;
    assert_eq!(app.tasks.len(), 1);
    Ok(())
}

#[tokio::test]
async fn integration_test_create_flow_closes_form_and_refetches() -> Result<()> {
    let created_id = Uuid::new_v4();
    let server = StubServer::start(vec![
        // Startup fetch: empty collection.
        json_response("200 OK", &page_json(&[])),
        // Create response.
        json_response(
            "201 Created",
            &remote_task_json(created_id, "Plan sprint", 1, false),
        ),
        // Refetch triggered by the successful mutation.
        json_response(
            "200 OK",
            &page_json(&[remote_task_json(created_id, "Plan sprint", 1, false)]),
        ),
    ])?;

    let mut app = App::new(settings_for(&server))?;
    drain_until(&mut app, |app| app.loaded).await?;
    assert!(app.display.is_empty());

    app.update(key(Key::Char('n')))?;
    for c in "Plan sprint".chars() {
        app.update(key(Key::Char(c)))?;
    }
    app.update(key(Key::Enter))?;
    match &app.active_dialog {
        ActiveDialog::TaskForm(form) => assert!(form.submitting),
        other => bail!("expected a submitting form, got {other:?}"),
    }

    drain_until(&mut app, |app| {
        app.active_dialog.is_none() && app.tasks.len() == 1
    })
    .await?;
    assert_eq!(app.tasks[0].title, "Plan sprint");
    assert!(app.footer_notice.is_some());
    Ok(())
}

#[tokio::test]
async fn integration_test_failed_create_reenables_form() -> Result<()> {
    let server = StubServer::start(vec![
        json_response("200 OK", &page_json(&[])),
        json_response("422 Unprocessable Entity", r#"{"detail":"title too long"}"#),
    ])?;

    let mut app = App::new(settings_for(&server))?;
    drain_until(&mut app, |app| app.loaded).await?;

    app.active_dialog = ActiveDialog::TaskForm(TaskFormState::new_task());
    for c in "Plan sprint".chars() {
        app.update(key(Key::Char(c)))?;
    }
    app.update(key(Key::Enter))?;

    drain_until(&mut app, |app| match &app.active_dialog {
        ActiveDialog::TaskForm(form) => !form.submitting,
        _ => false,
    })
    .await?;

    match &app.active_dialog {
        ActiveDialog::TaskForm(form) => {
            assert_eq!(
                form.error_message.as_deref(),
                Some("validation failed: title too long")
            );
            assert_eq!(form.title_input, "Plan sprint");
        }
        other => bail!("form should stay open after a failure, got {other:?}"),
    }
    Ok(())
}
