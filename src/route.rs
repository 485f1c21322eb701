/// Straight-line aiming for alien missiles.
///
/// A route is fixed when the missile is launched; missiles never re-aim in
/// flight.

use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MissileRoute {
    /// Change in x per tick.
    pub delta_x: f64,
    /// Change in y per tick.
    pub delta_y: f64,
}

/// Computes the per-tick translation from the centre of `firer` towards the
/// centre of `target` at `speed` pixels along the dominant axis.
///
/// Distances are integer pixels and the minor-axis component uses truncating
/// integer division.  When the vertical distance dominates (or ties), the
/// vertical component is always `+speed` whatever the sign of the vertical
/// distance, and the horizontal component is `dx * speed / dy`; a target
/// above the firer therefore gets a downward route with a mirrored
/// horizontal component.  A target centred exactly on the firer yields a
/// straight drop.
pub fn determine_missile_route(firer: &Rect, target: &Rect, speed: i32) -> MissileRoute {
    let firer_x = firer.x + firer.width / 2;
    let firer_y = firer.y + firer.height / 2;
    let target_x = target.x + target.width / 2;
    let target_y = target.y + target.height / 2;

    let distance_x = target_x - firer_x;
    let distance_y = target_y - firer_y;

    if distance_x.abs() > distance_y.abs() {
        let delta_x = if distance_x < 0 { -speed } else { speed };
        let delta_y = (distance_y * speed) / distance_x.abs();
        MissileRoute {
            delta_x: f64::from(delta_x),
            delta_y: f64::from(delta_y),
        }
    } else if distance_y == 0 {
        // |dx| <= |dy| == 0: both centres coincide
        MissileRoute {
            delta_x: 0.0,
            delta_y: f64::from(speed),
        }
    } else {
        MissileRoute {
            delta_x: f64::from((distance_x * speed) / distance_y),
            delta_y: f64::from(speed),
        }
    }
}
