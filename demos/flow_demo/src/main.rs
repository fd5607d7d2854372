// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted menu/HUD/dialog flow that exercises the lifecycle engine.
//!
//! Runs the classic demo scenario against scripted views: main menu up,
//! play (HUD replaces the menu on the same layer), settings overlay with
//! the scrim behind it, a confirmation dialog on top, then teardown.
//! Prints the lifecycle transcript and exports a JSON event log.

use lamina_core::ViewManager;
use lamina_core::id::{ChannelMask, LayerId, ViewId};
use lamina_core::registry::{LayerSpec, RegistrarConfig, ViewSpec};
use lamina_core::view::{LoaderRegistry, ViewData};
use lamina_debug::json::EventLog;
use lamina_harness::{CallLog, RecordingPresenter, ScriptedLoader};

const MAIN_MENU: ViewId = ViewId::from_name("MainMenu");
const GAME_HUD: ViewId = ViewId::from_name("GameHud");
const SETTINGS: ViewId = ViewId::from_name("Settings");
const CONFIRM_QUIT: ViewId = ViewId::from_name("ConfirmQuit");

/// 60 Hz stepping for the scrim fade.
const TICK: f32 = 1.0 / 60.0;

fn registrar() -> RegistrarConfig {
    let layer = |name: &str, is_overlay| LayerSpec {
        name: name.into(),
        is_overlay,
        channels: ChannelMask::NONE,
    };
    let view = |name: &str, layer_index, is_dialog, is_persistent| ViewSpec {
        name: name.into(),
        layer_index,
        content_ref: format!("ui/{name}"),
        is_dialog,
        is_persistent,
        loader_key: "scripted".into(),
    };
    RegistrarConfig {
        layers: vec![layer("Main", false), layer("Popup", true)],
        views: vec![
            view("MainMenu", 0, false, false),
            view("GameHud", 0, false, false),
            view("Settings", 1, false, true),
            view("ConfirmQuit", 0, true, false),
        ],
    }
}

fn step(manager: &mut ViewManager, seconds: f32) {
    let mut remaining = seconds;
    while remaining > 0.0 {
        manager.tick(TICK);
        remaining -= TICK;
    }
}

fn report(manager: &ViewManager, label: &str) {
    let greyout = manager.greyout();
    println!(
        "-- {label}: layer0={:?} dialogs={} scrim(alpha={:.2} blocking={})",
        manager.view_name_on_layer(LayerId(0)),
        manager.dialog_stack().len(),
        greyout.alpha(),
        greyout.is_blocking(),
    );
}

fn main() {
    let calls = CallLog::new();
    let presenter = RecordingPresenter::new();
    let event_log = EventLog::new();

    let mut loaders = LoaderRegistry::new();
    loaders.register(
        "scripted",
        Box::new(
            ScriptedLoader::new(calls.clone())
                .with_data_receiver("GameHud")
                .with_manual_out("MainMenu"),
        ),
    );

    let mut manager = ViewManager::with_diag(
        &registrar(),
        loaders,
        Box::new(presenter.clone()),
        Box::new(event_log.clone()),
    );
    manager.set_event_sink(Box::new(event_log.clone()));

    // Boot to the menu.
    manager.add_view(MAIN_MENU);
    report(&manager, "menu");

    // Play: the HUD targets the same layer, so the menu transitions out
    // first; its animation completion is reported by the "animation
    // system" (here: one explicit call).
    manager.add_view_with(GAME_HUD, ViewData::new(75_u32));
    report(&manager, "menu leaving");
    manager.finish_removal(MAIN_MENU);
    report(&manager, "hud");

    // Settings opens on the overlay layer; the scrim fades in behind it.
    manager.add_view(SETTINGS);
    step(&mut manager, 0.3);
    report(&manager, "settings");

    // Quit confirmation stacks on top; the scrim reparents behind it.
    manager.add_view(CONFIRM_QUIT);
    step(&mut manager, 0.1);
    report(&manager, "confirm");

    // Cancel: the dialog goes away, the scrim falls back to the overlay.
    manager.remove_all_dialogs(false);
    step(&mut manager, 0.1);
    report(&manager, "cancelled");

    // Close settings; the scrim fades out and eventually deactivates.
    manager.remove_view(SETTINGS);
    step(&mut manager, 0.5);
    report(&manager, "hud again");

    manager.remove_all_views(false);
    report(&manager, "teardown");

    println!();
    println!("view transcript:");
    for (view, call) in calls.records() {
        println!("  {view}: {call:?}");
    }

    println!();
    println!("presenter calls: {}", presenter.calls().len());
    println!();
    println!("event log:");
    let mut out = Vec::new();
    if event_log.write_to(&mut out).is_ok() {
        println!("{}", String::from_utf8_lossy(&out));
    }
}
