/*
 * Integration tests for tagtagtag-mixerd
 *
 * These drive the control loop against the in-memory card with the real
 * signal-aware waiter, so they exercise signal masking and ppoll as the
 * daemon uses them.
 */

use std::io::Write;

use serial_test::serial;
use tagtagtag_mixerd::control_loop::{ControlLoop, Flow};
use tagtagtag_mixerd::signals::{self, Trigger, Waiter, Wake};
use tempfile::NamedTempFile;
use ttt_core::hw::element;
use ttt_core::{
    decide, parse_config, ButtonState, Config, ConfigStore, ControlSurface, ElementValue,
    HardwareState, MemoryBackend, MemoryHandle, MixerError, ReloadOutcome, RoutingMode,
};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn raise(signal: libc::c_int) {
    // SAFETY: raise has no memory-safety preconditions; the signal is
    // blocked and has a handler installed by signals::install.
    assert_eq!(unsafe { libc::raise(signal) }, 0);
}

fn level(handle: &MemoryHandle, name: &str) -> i32 {
    handle.value(name).and_then(|v| v.integer_at(0)).unwrap()
}

fn clear_triggers() {
    Trigger::reload().take();
    Trigger::shutdown().take();
}

#[test]
#[serial]
fn test_pending_reload_signal_interrupts_wait() {
    let mut waiter = signals::install().unwrap();
    clear_triggers();
    let reload = Trigger::reload();

    raise(libc::SIGUSR1);
    // Blocked: the handler has not run yet
    assert!(!reload.is_raised());

    let mut pipe = [0 as libc::c_int; 2];
    // SAFETY: pipe writes two descriptors into a two-element array.
    assert_eq!(unsafe { libc::pipe(pipe.as_mut_ptr()) }, 0);
    let mut fds = [libc::pollfd {
        fd: pipe[0],
        events: libc::POLLIN,
        revents: 0,
    }];

    assert_eq!(waiter.wait(&mut fds).unwrap(), Wake::Interrupted);
    assert!(reload.take());
    assert!(!Trigger::shutdown().is_raised());

    // SAFETY: both descriptors came from pipe above.
    unsafe {
        libc::close(pipe[0]);
        libc::close(pipe[1]);
    }
}

#[test]
#[serial]
fn test_daemon_loop_reload_and_stop() {
    let waiter = signals::install().unwrap();
    clear_triggers();

    let mut file = config_file("mode=lineout\n");
    let backend = MemoryBackend::tagtagtag();
    let handle = backend.handle();
    handle.set_quiet(element::BUTTONS.name, ElementValue::Integer(vec![0, 1]));

    let surface = ControlSurface::open(backend).unwrap();
    let mut store = ConfigStore::new(file.path());
    assert_eq!(store.reload(), ReloadOutcome::Applied);
    let mut control = ControlLoop::new(surface, store, waiter);

    // Two requests before the wait collapse into one reload
    file.write_all(b"speaker-high=100\n").unwrap();
    file.flush().unwrap();
    raise(libc::SIGUSR1);
    raise(libc::SIGUSR1);
    assert_eq!(control.step().unwrap(), Flow::Continue);
    assert_eq!(control.config().generation(), 2);
    assert_eq!(level(&handle, element::SPEAKER_VOLUME.name), 121);

    raise(libc::SIGTERM);
    assert_eq!(control.step().unwrap(), Flow::Stop);
    assert_eq!(level(&handle, element::SPEAKER_VOLUME.name), 100);
    assert_eq!(level(&handle, element::HEADPHONE_VOLUME.name), 0);
    assert_eq!(level(&handle, element::PLAYBACK_VOLUME.name), 227);
    assert_eq!(control.config().generation(), 2);

    clear_triggers();
}

#[test]
fn test_lineout_end_to_end_values() {
    let config = parse_config("mode=lineout\n", &Config::default()).unwrap();
    assert_eq!(config.routing, RoutingMode::Lineout);

    let state = HardwareState {
        jack_present: false,
        buttons: ButtonState(false, true),
    };
    let out = decide(&config, &state).unwrap();
    assert_eq!(out.speaker_volume, 121);
    assert_eq!(out.headphone_volume, 0);
    assert_eq!(out.playback_volume, 227);
    assert!(!out.mono_mix_left);
    assert!(!out.mono_mix_right);
}

#[test]
fn test_reload_partial_and_rejected_files() {
    let file = config_file("speaker-high=110\nmicrophone=maybe\nmode=lineout\n");
    let mut store = ConfigStore::new(file.path());
    assert_eq!(store.reload(), ReloadOutcome::Applied);
    assert_eq!(store.current().speaker_high, 110);
    assert!(store.current().microphone);
    assert_eq!(store.current().routing, RoutingMode::Lineout);

    std::fs::write(file.path(), "speaker-high=90\nthis line has no separator\n").unwrap();
    assert_eq!(store.reload(), ReloadOutcome::Rejected);
    assert_eq!(store.current().speaker_high, 110);
    assert_eq!(store.generation(), 1);

    assert!(matches!(
        parse_config("no separator\n", &Config::default()),
        Err(MixerError::ConfigSyntax { line: 1, .. })
    ));
}

#[test]
fn test_missing_file_keeps_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut store = ConfigStore::new(dir.path().join("mixer.conf"));
    assert_eq!(store.reload(), ReloadOutcome::Unreadable);
    assert_eq!(*store.current(), Config::default());
}

#[test]
fn test_effective_config_json() {
    let json = serde_json::to_value(Config::default()).unwrap();
    assert_eq!(json["mode"], "headphone");
    assert_eq!(json["revision"], "current");
    assert_eq!(json["speaker-high"], 121);
    assert_eq!(json["capture-gain"], 39);
    assert_eq!(json["microphone"], true);
}
