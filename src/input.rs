use crate::catalog::ItemId;
use crate::view::{BoardView, SLOT_KEYS};
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Key { key: KeyCode, mods: KeyModifiers },
    Click { col: u16, row: u16 },
    Resize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Start,
    Tap(ItemId),
    HelpToggle,
    Back,
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press => out.push(InputEvent::Key {
                key: k.code,
                mods: k.modifiers,
            }),
            Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                out.push(InputEvent::Click {
                    col: m.column,
                    row: m.row,
                })
            }
            Event::Resize(_, _) => out.push(InputEvent::Resize),
            _ => {}
        }
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

/// Start requests are dropped while the start control is disabled unless
/// `allow_restart` is set.
pub(crate) fn map_event_to_action(
    view: &BoardView,
    help_open: bool,
    allow_restart: bool,
    ev: &InputEvent,
) -> Option<Action> {
    let start_ok = view.start_enabled() || allow_restart;

    if let InputEvent::Key { key, mods } = ev {
        if *key == KeyCode::Char('c') && mods.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Action::Quit),
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                return Some(Action::HelpToggle)
            }
            KeyCode::Esc if help_open => return Some(Action::Back),
            KeyCode::Esc => return Some(Action::Quit),
            _ => {}
        }
    }

    // help box swallows everything else
    if help_open {
        return None;
    }

    match ev {
        InputEvent::Key { key, .. } => match key {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') | KeyCode::Char('S') => {
                start_ok.then_some(Action::Start)
            }
            KeyCode::Char(ch) => {
                let slot = SLOT_KEYS.iter().position(|k| k == ch)?;
                view.tile_in_slot(slot).map(Action::Tap)
            }
            _ => None,
        },
        InputEvent::Click { col, row } => {
            if view.start_at(*col, *row) {
                start_ok.then_some(Action::Start)
            } else {
                view.tile_at(*col, *row).map(Action::Tap)
            }
        }
        InputEvent::Resize => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::View;

    fn key(ch: char) -> InputEvent {
        InputEvent::Key {
            key: KeyCode::Char(ch),
            mods: KeyModifiers::NONE,
        }
    }

    fn board() -> BoardView {
        let mut v = BoardView::new(5);
        let order: Vec<ItemId> = [3, 1, 4, 0, 5, 9, 2, 6, 8, 7].into_iter().map(ItemId).collect();
        v.render_tiles(&order);
        v.relayout(80, 24);
        v
    }

    #[test]
    fn number_keys_tap_grid_slots() {
        let v = board();
        assert_eq!(map_event_to_action(&v, false, false, &key('1')), Some(Action::Tap(ItemId(3))));
        assert_eq!(map_event_to_action(&v, false, false, &key('0')), Some(Action::Tap(ItemId(7))));
        assert_eq!(map_event_to_action(&v, false, false, &key('x')), None);
    }

    #[test]
    fn clicks_hit_tiles_and_start() {
        let v = board();
        let click = |col, row| InputEvent::Click { col, row };
        assert_eq!(map_event_to_action(&v, false, false, &click(20, 9)), Some(Action::Tap(ItemId(1))));
        assert_eq!(map_event_to_action(&v, false, false, &click(4, 5)), Some(Action::Start));
        assert_eq!(map_event_to_action(&v, false, false, &click(40, 1)), None);
    }

    #[test]
    fn start_respects_disabled_control() {
        let mut v = board();
        v.set_start_enabled(false);
        let enter = InputEvent::Key {
            key: KeyCode::Enter,
            mods: KeyModifiers::NONE,
        };
        assert_eq!(map_event_to_action(&v, false, false, &enter), None);
        assert_eq!(map_event_to_action(&v, false, true, &enter), Some(Action::Start));
    }

    #[test]
    fn help_box_swallows_game_input() {
        let v = board();
        assert_eq!(map_event_to_action(&v, true, false, &key('1')), None);
        let esc = InputEvent::Key {
            key: KeyCode::Esc,
            mods: KeyModifiers::NONE,
        };
        assert_eq!(map_event_to_action(&v, true, false, &esc), Some(Action::Back));
        assert_eq!(map_event_to_action(&v, false, false, &esc), Some(Action::Quit));
        assert_eq!(map_event_to_action(&v, true, false, &key('q')), Some(Action::Quit));
    }
}
