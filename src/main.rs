mod app;
mod click;
mod render;

use std::{cell::RefCell, io, rc::Rc};

use app::{App, AppKey};
use click::{pixel_y_to_row, ClickState};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use rebirth_clicker::{Clock, Engine, SystemClock};

#[cfg(target_arch = "wasm32")]
type GameStorage = rebirth_clicker::storage::LocalStorage;
#[cfg(not(target_arch = "wasm32"))]
type GameStorage = rebirth_clicker::MemoryStorage;

/// Query the grid container's bounding rect and convert pixel coordinates to a row.
fn dom_pixel_to_row(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_y = mouse_y as f64 - rect.top();
    let click_x = mouse_x as f64 - rect.left();

    if click_x < 0.0 {
        return None;
    }

    let row = pixel_y_to_row(click_y, rect.height(), cs.terminal_rows);
    log::debug!(
        "click: pixel_y={}, row={:?}, targets={}",
        mouse_y,
        row,
        cs.targets.len()
    );
    row
}

#[cfg(target_arch = "wasm32")]
fn init_logging() {
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger init failed: {e}").into());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    env_logger::init();
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    init_logging();

    let engine = Engine::load(GameStorage::default(), SystemClock);
    let app = Rc::new(RefCell::new(App::new(engine)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    log::info!("Rebirth Clicker starting");

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }

            let row = match dom_pixel_to_row(mouse_event.x, mouse_event.y, &cs) {
                Some(r) => r,
                None => return,
            };

            let matched_key = cs.find_target_key(row);
            drop(cs);

            if let Some(key) = matched_key {
                app.borrow_mut().handle_key(AppKey::Char(key));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            let key = match key_event.code {
                KeyCode::Char(c) => AppKey::Char(c),
                KeyCode::Enter => AppKey::Enter,
                KeyCode::Backspace => AppKey::Backspace,
                KeyCode::Esc => AppKey::Esc,
                _ => return,
            };
            app.borrow_mut().handle_key(key);
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let mut a = app.borrow_mut();
            a.frame(SystemClock.now_ms());
            render::render(f, &*a, &click_state);
        }
    });

    Ok(())
}
