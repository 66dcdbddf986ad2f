use std::time::Duration;

use ambimix::shared::{DisplayState, InputEvent, TIMER_CHOICES, VOLUME_STEP};
use ambimix::volume;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use super::mode::TuiState;

// poll for a key press and resolve it against what is on screen, so the
// mixer only ever sees semantic events with concrete ids and values
pub fn poll_input(timeout: Duration, ts: &mut TuiState, ds: &DisplayState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts, ds).into_iter().collect());
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState, ds: &DisplayState) -> Option<InputEvent> {
    let selected = ds.sounds.get(ts.cursor);
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(InputEvent::Quit),

        KeyCode::Up => {
            ts.move_cursor(-1, ds.sounds.len());
            None
        }
        KeyCode::Down => {
            ts.move_cursor(1, ds.sounds.len());
            None
        }

        KeyCode::Char(' ') => selected.map(|s| InputEvent::ToggleSound(s.id.clone())),
        KeyCode::Left => selected.map(|s| nudge_sound(&s.id, s.volume, -VOLUME_STEP)),
        KeyCode::Right => selected.map(|s| nudge_sound(&s.id, s.volume, VOLUME_STEP)),

        KeyCode::Char('[') => Some(InputEvent::SetMasterVolume(nudge(ds.master_volume, -VOLUME_STEP))),
        KeyCode::Char(']') => Some(InputEvent::SetMasterVolume(nudge(ds.master_volume, VOLUME_STEP))),

        KeyCode::Char('p') => Some(InputEvent::ToggleAll),
        KeyCode::Char('r') => Some(InputEvent::ResetAll),
        KeyCode::Char('t') => Some(InputEvent::SetTimer(next_timer(ds.timer_minutes))),

        KeyCode::Char(c @ '1'..='9') => {
            let idx = c as usize - '1' as usize;
            ds.presets.get(idx).map(|p| InputEvent::ApplyPreset(p.id.clone()))
        }
        KeyCode::Char('s') => Some(InputEvent::SavePreset(next_mix_name(ds))),
        KeyCode::Char('d') => ds
            .presets
            .iter()
            .rev()
            .find(|p| p.custom)
            .map(|p| InputEvent::DeletePreset(p.id.clone())),

        _ => None,
    }
}

fn nudge(volume: u8, delta: i16) -> u8 {
    volume::clamp(volume as i16 + delta)
}

fn nudge_sound(id: &str, current: u8, delta: i16) -> InputEvent {
    InputEvent::SetSoundVolume(id.to_string(), nudge(current, delta))
}

// the choice after the current one, wrapping back to "off"
fn next_timer(current: u32) -> u32 {
    TIMER_CHOICES
        .iter()
        .copied()
        .find(|&m| m > current)
        .unwrap_or(TIMER_CHOICES[0])
}

// "Mix 1", "Mix 2", ... first name not already taken
fn next_mix_name(ds: &DisplayState) -> String {
    (1..)
        .map(|n| format!("Mix {n}"))
        .find(|name| !ds.presets.iter().any(|p| p.custom && &p.name == name))
        .unwrap_or_else(|| "Mix".to_string())
}
