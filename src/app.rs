//! Front-end state for the clicker screen: input modes, the message log and
//! the frame clock. All game rules live in the engine; this only routes keys
//! to engine commands and turns outcomes into log lines.

use rebirth_clicker::{
    format_number, BuyOutcome, Clock, Engine, GameClock, RebirthOutcome, Storage, UpgradeKind,
};

/// Longest code the entry field accepts.
const MAX_CODE_LEN: usize = 32;

/// Log entries kept on screen.
const MAX_LOG: usize = 50;

#[derive(Clone, Debug, PartialEq)]
pub enum InputMode {
    /// Normal play.
    Play,
    /// Typing a code.
    EnterCode,
    /// Waiting for `y` before a rebirth.
    ConfirmRebirth,
    /// Waiting for `y` before wiping the save.
    ConfirmReset,
}

/// Keys the app reacts to, normalized from keyboard and click sources.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AppKey {
    Char(char),
    Enter,
    Backspace,
    Esc,
}

/// Represents a message log entry.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

pub struct App<S, C> {
    pub engine: Engine<S, C>,
    pub input_mode: InputMode,
    pub code_buffer: String,
    pub log: Vec<LogEntry>,
    frame_clock: GameClock,
}

impl<S: Storage, C: Clock> App<S, C> {
    /// Wrap a loaded engine and credit any offline income.
    pub fn new(engine: Engine<S, C>) -> Self {
        let mut app = Self {
            engine,
            input_mode: InputMode::Play,
            code_buffer: String::new(),
            log: Vec::new(),
            frame_clock: GameClock::default(),
        };
        app.add_log("Rebirth Clicker へようこそ！", true);

        let offline = app.engine.catch_up();
        if offline.earned > 0.0 {
            app.add_log(
                &format!(
                    "留守の間に {} 獲得 ({}秒)",
                    format_number(offline.earned),
                    format_number(offline.seconds.floor())
                ),
                true,
            );
        }
        app
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        // Keep log manageable
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// Advance passive income to the frame timestamp `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        let elapsed = self.frame_clock.update(now_ms);
        if elapsed > 0.0 {
            self.engine.tick(elapsed);
        }
    }

    pub fn handle_key(&mut self, key: AppKey) {
        match self.input_mode {
            InputMode::Play => self.handle_play_key(key),
            InputMode::EnterCode => self.handle_code_key(key),
            InputMode::ConfirmRebirth => {
                self.input_mode = InputMode::Play;
                if is_yes(key) {
                    self.rebirth();
                } else {
                    self.add_log("転生をキャンセルしました", false);
                }
            }
            InputMode::ConfirmReset => {
                self.input_mode = InputMode::Play;
                if is_yes(key) {
                    self.engine.reset();
                    self.add_log("セーブデータをリセットしました", true);
                } else {
                    self.add_log("リセットをキャンセルしました", false);
                }
            }
        }
    }

    fn handle_play_key(&mut self, key: AppKey) {
        let c = match key {
            AppKey::Char(c) => c.to_ascii_lowercase(),
            _ => return,
        };
        match c {
            ' ' | 'c' => {
                self.engine.click();
            }
            '1' => self.buy(UpgradeKind::Power),
            '2' => self.buy(UpgradeKind::Auto),
            'r' => {
                if self.engine.can_rebirth() {
                    self.input_mode = InputMode::ConfirmRebirth;
                    self.add_log(
                        "転生するとスコアとアップグレードがリセットされます。[Y] で実行",
                        true,
                    );
                } else {
                    // Let the engine report how much is missing.
                    self.rebirth();
                }
            }
            'g' => {
                self.code_buffer.clear();
                self.input_mode = InputMode::EnterCode;
            }
            'x' => {
                self.input_mode = InputMode::ConfirmReset;
                self.add_log("全ての進行状況を消去しますか？ [Y] で実行", true);
            }
            _ => {}
        }
    }

    fn handle_code_key(&mut self, key: AppKey) {
        match key {
            AppKey::Char(c) if !c.is_control() => {
                if self.code_buffer.chars().count() < MAX_CODE_LEN {
                    self.code_buffer.push(c);
                }
            }
            AppKey::Char(_) => {}
            AppKey::Backspace => {
                self.code_buffer.pop();
            }
            AppKey::Enter => {
                let outcome = self.engine.redeem_code(&self.code_buffer);
                self.add_log(&outcome.message(), outcome.is_success());
                self.code_buffer.clear();
                self.input_mode = InputMode::Play;
            }
            AppKey::Esc => {
                self.code_buffer.clear();
                self.input_mode = InputMode::Play;
            }
        }
    }

    fn buy(&mut self, kind: UpgradeKind) {
        match self.engine.buy_upgrade(kind) {
            BuyOutcome::Purchased { kind, level, cost } => {
                self.add_log(
                    &format!("{} Lv{} を購入 (-{})", kind.name(), level, format_number(cost)),
                    false,
                );
            }
            BuyOutcome::InsufficientScore { kind, missing, .. } => {
                self.add_log(
                    &format!("{} を買うにはあと {} 必要", kind.name(), format_number(missing)),
                    false,
                );
            }
        }
    }

    fn rebirth(&mut self) {
        match self.engine.rebirth() {
            RebirthOutcome::Reborn {
                rebirths,
                multiplier,
            } => {
                self.add_log(
                    &format!(
                        "★ 転生 {}回目！ 倍率 x{} ★",
                        rebirths,
                        format_number(multiplier)
                    ),
                    true,
                );
            }
            RebirthOutcome::RequirementNotMet { requirement, needed } => {
                self.add_log(
                    &format!(
                        "転生には {} 必要 (あと {})",
                        format_number(requirement),
                        format_number(needed)
                    ),
                    false,
                );
            }
        }
    }
}

/// `y` or `Y` confirms; any other key cancels.
fn is_yes(key: AppKey) -> bool {
    matches!(key, AppKey::Char(c) if c.eq_ignore_ascii_case(&'y'))
}
