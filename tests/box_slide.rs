mod common;

use glam::{Quat, Vec3};
use particle_accelerator::{Material, Transform, World};

/// A cube dropped onto a floor tilted 20 degrees about Z should pick up
/// tangential speed from gravity resolved along the incline, moderated by
/// friction, rather than staying put or flying off.
#[test]
fn box_on_tilted_floor_slides_downhill() {
    let shape = common::unit_cube_shape();
    let mut world = World::new().with_gravity(Vec3::new(0.0, -9.81, 0.0));

    let tilt = Quat::from_rotation_z(20.0_f32.to_radians());
    world
        .add_static_body(
            common::floor_shape(),
            Transform::from_position_rotation(Vec3::new(0.0, -0.5, 0.0), tilt),
            1.0,
        )
        .unwrap();

    let material = Material {
        restitution: 0.0,
        friction: 0.4,
        ..Material::default()
    };
    let body = world
        .add_dynamic_body(shape, Transform::from_position(Vec3::new(0.0, 0.6, 0.0)), 1.0, material)
        .unwrap();

    let dt = 1.0 / 240.0;
    for _ in 0..(1.0 / dt) as u32 {
        world.step(dt, 8).unwrap();
    }

    let final_body = world.get_body(body).unwrap();
    let speed = final_body.velocity.linear.length();

    // Tangential speed grows at |g*sin(theta) - mu*g*cos(theta)| * t while the
    // box stays in contact. The box spends a fraction of the 1s run free-falling
    // onto the incline before sliding starts, so we only check the final speed
    // falls within a generous band around the steady-state rate rather than
    // matching it exactly.
    let theta = 20.0_f32.to_radians();
    let g = 9.81;
    let mu = material.friction;
    let rate = (g * theta.sin() - mu * g * theta.cos()).abs();
    let elapsed = 1.0;
    let expected = rate * elapsed;

    assert!(
        speed > 0.1 * expected && speed < 3.0 * expected,
        "tangential speed {speed} far from expected growth curve ~{expected} (rate {rate}/s)"
    );
}
