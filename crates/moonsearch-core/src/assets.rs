//! Fixed manifest of sound and image resources.

/// Every sound the experience can play. Keys double as audio track ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundKey {
    BgmPrologue,
    BgmSearch,
    ShipIdle,
    ShipLaunch,
    ShipLaunch2,
    Touch,
    Popup,
    LockAlarm,
    Scan,
}

impl SoundKey {
    pub const ALL: [SoundKey; 9] = [
        SoundKey::BgmPrologue,
        SoundKey::BgmSearch,
        SoundKey::ShipIdle,
        SoundKey::ShipLaunch,
        SoundKey::ShipLaunch2,
        SoundKey::Touch,
        SoundKey::Popup,
        SoundKey::LockAlarm,
        SoundKey::Scan,
    ];

    pub fn url(self) -> &'static str {
        match self {
            SoundKey::BgmPrologue => "/bgm_prologue.mp3",
            SoundKey::BgmSearch => "/bgm_moon_search.mp3",
            SoundKey::ShipIdle => "/se_spaceship_taiki.mp3",
            SoundKey::ShipLaunch => "/se_spaceship_launch1.mp3",
            SoundKey::ShipLaunch2 => "/se_spaceship_launch2.mp3",
            SoundKey::Touch => "/se_touch.mp3",
            SoundKey::Popup => "/se_popup.mp3",
            SoundKey::LockAlarm => "/se_keikoku.mp3",
            SoundKey::Scan => "/se_moon_search2.mp3",
        }
    }
}

/// Images referenced by key from target and phase cues. Loading and
/// drawing them belongs to the front-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageKey {
    Moon,
    Mars,
    Mercury,
    Saturn,
    Lifeform,
    Starfield,
}

impl ImageKey {
    pub fn url(self) -> &'static str {
        match self {
            ImageKey::Moon => "/FullMoon.png",
            ImageKey::Mars => {
                "https://upload.wikimedia.org/wikipedia/commons/0/02/OSIRIS_Mars_true_color.jpg"
            }
            ImageKey::Mercury => {
                "https://upload.wikimedia.org/wikipedia/commons/4/4a/Mercury_in_true_color.jpg"
            }
            ImageKey::Saturn => {
                "https://upload.wikimedia.org/wikipedia/commons/c/c7/Saturn_during_Equinox.jpg"
            }
            ImageKey::Lifeform => "/lifeform.png",
            ImageKey::Starfield => "/space_background1.png",
        }
    }
}

const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "ogg", "m4a", "aac"];

/// True when the locator ends in a known audio file extension.
pub fn is_audio_url(url: &str) -> bool {
    url.rsplit_once('.')
        .map(|(_, ext)| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
