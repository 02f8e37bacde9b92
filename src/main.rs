use std::collections::HashSet;
use std::path::Path;

use glam::{Mat4, Vec3};
use glow::HasContext;

use meshview3d::abs::{App, ShaderProgram};
use meshview3d::config::Settings;
use meshview3d::model::Model;

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn main() {
    setup_logger().expect("failed to install logger");

    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "settings.json".to_string());
    let settings = match Settings::load(Path::new(&settings_path)) {
        Ok(settings) => settings,
        Err(e) => {
            log::info!("using default settings ({settings_path}: {e})");
            Settings::default()
        }
    };

    let mut app = App::new(&settings.title, settings.width, settings.height);

    unsafe {
        app.gl.enable(glow::DEPTH_TEST);
    }

    let shader = match ShaderProgram::from_files(
        &app.gl,
        Path::new(&settings.vertex_shader),
        Path::new(&settings.fragment_shader),
        settings.geometry_shader.as_deref().map(Path::new),
    ) {
        Ok(program) => program,
        Err(e) => {
            // An unlinked program must never receive draw calls.
            log::error!("{e}");
            return;
        }
    };

    let model = Model::load(&app.gl, &settings.model).unwrap_or_else(|e| {
        log::error!("{e}");
        Model::empty()
    });

    // Projection & view matrices
    let mut projection = Mat4::perspective_rh_gl(
        settings.fov_degrees.to_radians(),
        settings.width as f32 / settings.height as f32,
        0.1,
        400.0,
    );
    let mut view;

    let mut yaw: f32 = -90.0;
    let mut pitch: f32 = 0.0;
    let mut vel = Vec3::ZERO;
    let mut position = Vec3::new(0.0, 0.5, 3.0);
    let mut front = Vec3::new(0.0, 0.0, -1.0);

    let mut grabbed = true;

    let mut keys_pressed = HashSet::new();

    let [bg_r, bg_g, bg_b] = settings.background;

    // Main loop
    'running: loop {
        // Grab or ungrab mouse
        app.sdl.mouse().set_relative_mouse_mode(grabbed);

        // Handle events
        for event in app.event_pump.poll_iter() {
            match event {
                sdl2::event::Event::Quit { .. } => break 'running,
                sdl2::event::Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(width, height),
                    ..
                } => {
                    unsafe {
                        app.gl.viewport(0, 0, width, height);
                    }
                    projection = Mat4::perspective_rh_gl(
                        settings.fov_degrees.to_radians(),
                        width as f32 / height as f32,
                        0.1,
                        400.0,
                    );
                }
                sdl2::event::Event::MouseMotion { xrel, yrel, .. } => {
                    if grabbed {
                        let sensitivity = 0.1;
                        yaw += (xrel as f32) * sensitivity;
                        pitch -= (yrel as f32) * sensitivity;

                        pitch = pitch.clamp(-89.0, 89.0);

                        let yaw_radians = yaw.to_radians();
                        let pitch_radians = pitch.to_radians();
                        front.x = yaw_radians.cos() * pitch_radians.cos();
                        front.y = pitch_radians.sin();
                        front.z = yaw_radians.sin() * pitch_radians.cos();
                        front = front.normalize();
                    }
                }
                sdl2::event::Event::KeyDown {
                    keycode: Some(sdl2::keyboard::Keycode::Escape),
                    ..
                } => {
                    grabbed = !grabbed;
                }
                sdl2::event::Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    keys_pressed.insert(keycode);
                }
                sdl2::event::Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    keys_pressed.remove(&keycode);
                }
                _ => {}
            }
        }

        if keys_pressed.contains(&sdl2::keyboard::Keycode::W) {
            vel += front.with_y(0.0).normalize() * 0.06;
        }
        if keys_pressed.contains(&sdl2::keyboard::Keycode::S) {
            vel -= front.with_y(0.0).normalize() * 0.06;
        }
        if keys_pressed.contains(&sdl2::keyboard::Keycode::A) {
            let right = front.cross(Vec3::Y).normalize();
            vel -= right * 0.06;
        }
        if keys_pressed.contains(&sdl2::keyboard::Keycode::D) {
            let right = front.cross(Vec3::Y).normalize();
            vel += right * 0.06;
        }
        if keys_pressed.contains(&sdl2::keyboard::Keycode::Space) {
            vel += Vec3::new(0.0, 0.06, 0.0);
        }
        if keys_pressed.contains(&sdl2::keyboard::Keycode::LShift) {
            vel -= Vec3::new(0.0, 0.06, 0.0);
        }
        position += vel;
        vel *= 0.8;

        // Update view matrix with new position
        view = Mat4::look_at_rh(position, position + front, Vec3::Y);

        unsafe {
            // Clear screen
            app.gl.clear_color(bg_r, bg_g, bg_b, 1.0);
            app.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        // Render the model
        shader.use_program();
        shader.set_uniform("u_projection", projection);
        shader.set_uniform("u_view", view);
        shader.set_uniform("u_model", Mat4::IDENTITY);
        shader.set_uniform("u_view_pos", position);
        shader.set_uniform("u_light_dir", Vec3::new(-0.4, -1.0, -0.3));
        shader.set_uniform("u_shininess", 32.0f32);
        model.draw(&shader);

        // Swap window buffers
        app.window.gl_swap_window();
    }
}
