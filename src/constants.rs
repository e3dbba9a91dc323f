/// DOM hooks and copy for the web front-end.
///
/// Kept free of crate imports so host-side tests can `include!` it.
// Phase screens, one per phase; only the active one is visible
pub const SCREEN_INTRO_ID: &str = "screen-intro";
pub const SCREEN_LAUNCH_ID: &str = "screen-launch";
pub const SCREEN_SEARCH_ID: &str = "screen-search";
pub const SCREEN_CLIMAX_ID: &str = "screen-climax";

// Buttons
pub const START_BUTTON_ID: &str = "start-button";
pub const IGNITION_BUTTON_ID: &str = "ignition-button";
pub const POPUP_CLOSE_ID: &str = "popup-close";

// Intro log
pub const INTRO_LOG_ID: &str = "intro-log";

// Launch screen
pub const LAUNCH_STATUS_ID: &str = "launch-status";
pub const WARP_CLASS: &str = "warp";

// Search HUD
pub const TARGET_ID: &str = "target";
pub const TARGET_IMAGE_ID: &str = "target-image";
pub const ARROW_ID: &str = "guide-arrow";
pub const SIGNAL_ID: &str = "signal";
pub const LOCK_RING_ID: &str = "lock-ring";
pub const LOCK_BAR_ID: &str = "lock-bar";
pub const SENSOR_NOTICE_ID: &str = "sensor-notice";
pub const SHOOTING_STAR_ID: &str = "shooting-star";

// Discovery popup
pub const POPUP_ID: &str = "discovery-popup";
pub const POPUP_TITLE_ID: &str = "popup-title";
pub const POPUP_BODY_ID: &str = "popup-body";

pub const HIDDEN_CLASS: &str = "hidden";
pub const LOCKED_CLASS: &str = "locked";

/// Boot log shown during the intro, one entry per scheduled line.
pub const INTRO_LINES: [(&str, &str); 15] = [
    ("SYSTEM BOOT SEQUENCE...", "システム初期化中..."),
    ("ESTABLISHING NEURAL LINK...", "神経接続を確立中..."),
    ("BIOS CHECK: OK", "BIOSチェック：正常"),
    ("LOADING PERIPHERAL DRIVERS...", "周辺機器ドライバ読み込み中..."),
    ("CALIBRATING SENSORS...", "センサーキャリブレーション実行中..."),
    ("OPTIMIZING POWER OUTPUT...", "出力最適化中..."),
    ("SYNCHRONIZING AUDIO WAVES...", "音響波形同期中..."),
    ("TARGET ACQUIRED: [ THE MOON ]", "ターゲット確認：月"),
    ("CALCULATING TRAJECTORY...", "軌道計算中..."),
    ("ESTIMATED TRAVEL TIME: UNKNOWN", "推定移動時間：不明"),
    ("LIFE SUPPORT SYSTEMS: ACTIVE", "生命維持装置：アクティブ"),
    ("ALL SYSTEMS GREEN.", "全システム正常"),
    ("INITIALIZING LAUNCH PROTOCOLS...", "発射プロトコル初期化中..."),
    ("ARE YOU READY?", "準備はいいかい？"),
    ("STANDBY FOR PILOT INPUT.", "パイロット入力待機中"),
];

pub const SENSOR_DENIED_TEXT: &str = "SENSOR ACCESS DENIED. ALLOW MOTION ACCESS AND TAP IGNITION AGAIN.";
pub const AWAITING_SENSOR_TEXT: &str = "WAITING FOR SENSOR DATA... MOVE YOUR DEVICE";
pub const WARP_TEXT: &str = "IGNITION SEQUENCE START";
