use bevy::prelude::*;
use bevy::window::WindowResolution;
use starship_sandbox::plugin::SessionPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Starship Sandbox".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // SessionPlugin loads assets/game.toml, opens the session against the
        // primary window and drives it once per frame.
        .add_plugins(SessionPlugin)
        .run();
}
