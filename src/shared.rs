// Types shared between the mixer core and the terminal front end.
//
// Keys (resolved into semantic events by tui/input.rs):
//   Up / Down       //  move the sound cursor (local to the TUI)
//   Space           //  ToggleSound(cursor)
//   Left / Right    //  SetSoundVolume(cursor, volume -/+ 5)
//   [ / ]           //  SetMasterVolume(master -/+ 5)
//   p               //  ToggleAll
//   r               //  ResetAll
//   t               //  SetTimer(next entry of TIMER_CHOICES)
//   1 .. 9          //  ApplyPreset(n-th preset, defaults first)
//   s               //  SavePreset("Mix N")
//   d               //  DeletePreset(newest custom preset)
//   Esc / q         //  Quit
//
// The view never owns mixer state; each frame it asks the controller for a
// `DisplayState` and draws exactly that.

pub const MAX_VOLUME: u8 = 100;
pub const DEFAULT_MASTER_VOLUME: u8 = 50;
pub const DEFAULT_SOUND_VOLUME: u8 = 50; // what a silent sound jumps to when turned on
pub const VOLUME_STEP: i16 = 5;

// minutes; 0 means "no timer"
pub const TIMER_CHOICES: [u32; 6] = [0, 5, 10, 15, 30, 60];

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    ToggleSound(String),
    SetSoundVolume(String, u8),
    SetMasterVolume(u8),
    ToggleAll,
    ResetAll,
    SetTimer(u32), // minutes, 0 = off
    ApplyPreset(String),
    SavePreset(String),
    DeletePreset(String),
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SoundRow {
    pub id: String,
    pub name: String,
    pub volume: u8,           // individual knob
    pub effective_volume: u8, // what the engine is actually told
    pub playing: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PresetRow {
    pub id: String,
    pub name: String,
    pub custom: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub sounds: Vec<SoundRow>,
    pub master_volume: u8,
    pub any_playing: bool,
    pub timer_minutes: u32,
    pub countdown: Option<String>, // "M:SS" while running
    pub presets: Vec<PresetRow>,
    pub notice: Option<String>,
}
