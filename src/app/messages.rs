use tuirealm::event::KeyEvent;

/// Messages driving the update loop. Keyboard input stays raw here and
/// is interpreted against the active dialog and mode in `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Key(KeyEvent),
    ScrollUp,
    ScrollDown,
    Resize(u16, u16),
    Tick,
}
