use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // An alarm overlay captures dismissal keys; everything else falls
    // through so the dashboard stays usable during an alarm
    if app.alarm_overlay_visible() {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('d') => {
                app.dismiss_alarm();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::History),
        KeyCode::Char('3') => app.set_view(View::Logs),

        // Force an immediate poll
        KeyCode::Char('r') => {
            let _ = app.poll_reading();
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // History view: date range adjustment and export
        KeyCode::Char('[') if app.current_view == View::History => app.shift_history_start(-1),
        KeyCode::Char(']') if app.current_view == View::History => app.shift_history_start(1),
        KeyCode::Char('{') if app.current_view == View::History => app.shift_history_end(-1),
        KeyCode::Char('}') if app.current_view == View::History => app.shift_history_end(1),
        KeyCode::Char('t') if app.current_view == View::History => app.reset_history_range(),
        KeyCode::Char('g') if app.current_view == View::History => app.request_history(),
        KeyCode::Char('e') if app.current_view == View::History => {
            match app.export_history(None) {
                Ok(path) => app.set_status_message(format!("Exported {}", path.display())),
                Err(e) => app.set_status_message(format!("Export failed: {e}")),
            }
        }

        // Logs view: clear the error log display (local only)
        KeyCode::Char('c') if app.current_view == View::Logs => {
            app.clear_error_log();
            app.set_status_message("Error log cleared (display only)".to_string());
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        LabelPolicy, Monitor, RollingSeries, SeedPolicy, SnapshotStore, Thresholds,
    };
    use crate::source::{ChannelSource, Reading};
    use chrono::Utc;
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(dir: &TempDir) -> (tokio::sync::watch::Sender<Option<Reading>>, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::new(
            Box::new(source),
            None,
            Monitor::new(Thresholds::default()),
            RollingSeries::new(5, SeedPolicy::HistoryReplay, LabelPolicy::WallClock),
            SnapshotStore::new(
                dir.path().join("state.json"),
                std::time::Duration::from_secs(300),
            ),
        );
        (tx, app)
    }

    #[test]
    fn test_q_quits() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_tab_cycles_views() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::History);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[test]
    fn test_dismiss_key_clears_alarm_overlay() {
        let dir = TempDir::new().unwrap();
        let (tx, mut app) = test_app(&dir);

        tx.send(Some(Reading {
            front: 0.1,
            rear: 0.2,
            timestamp: Utc::now(),
        }))
        .unwrap();
        app.poll_reading();
        assert!(app.alarm_overlay_visible());

        handle_key_event(&mut app, key(KeyCode::Char('d')));
        assert!(!app.alarm_overlay_visible());
        // The app is still running; 'd' was consumed by the overlay
        assert!(app.running);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert!(!app.show_help);
    }

    #[test]
    fn test_clear_error_log_only_in_logs_view() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);
        app.error_entries.push(crate::source::LogRecord {
            timestamp: Utc::now(),
            front_pressure: Some(0.1),
            rear_pressure: Some(0.2),
        });

        // Dashboard view: 'c' does nothing
        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.error_entries.len(), 1);

        app.set_view(View::Logs);
        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.error_entries.is_empty());
    }
}
