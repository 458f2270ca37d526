use log::debug;

use super::math::{Segment, Vec2};

/// Default number of transitions before a chain is cut off as a closed orbit.
pub const MAX_BOUNCES: u32 = 10000;
/// Default length of the probe sent out after every reflection.
pub const PROBE_REACH: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Circle {
        Circle {
            center: Vec2::new(x, y),
            radius,
        }
    }

    /// Inclusive: points on the boundary are inside.
    #[inline(always)]
    pub fn contains(&self, point: Vec2) -> bool {
        point.squared_distance(self.center) <= self.radius * self.radius
    }
}

/// Circles are identified by their index, which the simulator uses to
/// skip the surface it has just left.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub circles: Vec<Circle>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// First surface crossing met when travelling from the probe origin.
    pub point: Vec2,
    /// Unit incoming direction mirrored about the surface normal.
    pub direction: Vec2,
}

/// Collides a probe segment with a circle.
///
/// The segment counts as colliding when either endpoint is inside the
/// circle, or when the point of the infinite line closest to the center is
/// inside the circle and within the segment's bounding rectangle. The
/// returned point is found by backing off from that closest point toward the
/// probe origin by half the chord length.
///
/// No clamping is applied: if rounding puts the closest point outside the
/// circle while an endpoint is inside, the chord length is NaN and so is the
/// collision point. The simulator treats that as degenerate geometry.
///
/// The order of floating point operations is part of the contract: bounce
/// chains are chaotic, and a different rounding in the last bit gives a
/// different chain after a few dozen reflections.
pub fn intersect(circle: &Circle, segment: &Segment) -> Option<Collision> {
    let direction = segment.direction();
    let len = direction.len();
    let t = (circle.center - segment.origin).dot(direction) / (len * len);
    let closest = segment.origin + direction * t;

    let collides = circle.contains(segment.origin)
        || circle.contains(segment.target)
        || (circle.contains(closest) && segment.bounds_contain(closest));
    if !collides {
        return None;
    }

    let distance = closest.distance(circle.center);
    // half chord: distance from the closest point to the surface along the line
    let travel = (circle.radius * circle.radius - distance * distance).sqrt();
    let back = segment.origin - closest;
    let point = closest + back / (back.len() / travel);

    let normal = (point - circle.center) / circle.radius;
    let incoming = direction.normalize();
    Some(Collision {
        point,
        direction: incoming.reflect(normal),
    })
}

/// Finds the collision nearest to the probe origin, skipping `excluded`.
/// Ties keep the circle that comes first in the scene.
pub fn nearest_hit(
    scene: &Scene,
    segment: &Segment,
    excluded: Option<usize>,
) -> Option<(usize, Collision)> {
    let mut closest: Option<(usize, Collision, f64)> = None;
    for (index, circle) in scene.circles.iter().enumerate() {
        if excluded == Some(index) {
            continue;
        }
        if let Some(collision) = intersect(circle, segment) {
            let distance = collision.point.squared_distance(segment.origin);
            let nearer = match closest {
                Some((_, _, closest_distance)) => distance < closest_distance,
                None => true,
            };
            if nearer {
                closest = Some((index, collision, distance));
            }
        }
    }
    closest.map(|(index, collision, _)| (index, collision))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The last probe reached its target without touching any circle.
    Escaped,
    /// The bounce budget ran out, most likely on a closed orbit.
    Exhausted,
    /// The probe or a collision point stopped being a finite, non-empty segment.
    Degenerate,
}

#[derive(Debug, Clone, Copy)]
pub struct BounceParams {
    pub max_bounces: u32,
    /// Length of the probe after each reflection.
    pub reach: f64,
}

impl Default for BounceParams {
    fn default() -> Self {
        BounceParams {
            max_bounces: MAX_BOUNCES,
            reach: PROBE_REACH,
        }
    }
}

/// A bounce chain in progress. Every call to `next` performs one transition
/// and yields the segment it realised; once the chain stops, `termination`
/// tells why. Cloning an unstarted chain gives an independent replay.
#[derive(Debug, Clone)]
pub struct Bounces<'a> {
    scene: &'a Scene,
    probe: Segment,
    excluded: Option<usize>,
    remaining: u32,
    reach: f64,
    termination: Option<Termination>,
}

pub fn simulate<'a>(scene: &'a Scene, ray: Segment, params: BounceParams) -> Bounces<'a> {
    Bounces {
        scene,
        probe: ray,
        excluded: None,
        remaining: params.max_bounces,
        reach: params.reach,
        termination: None,
    }
}

impl<'a> Bounces<'a> {
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    fn stop(&mut self, termination: Termination) {
        if termination == Termination::Degenerate {
            debug!("bounce chain hit degenerate geometry at probe {:?}", self.probe);
        }
        self.termination = Some(termination);
    }
}

impl<'a> Iterator for Bounces<'a> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.termination.is_some() {
            return None;
        }
        if self.remaining == 0 {
            self.stop(Termination::Exhausted);
            return None;
        }
        if !self.probe.is_finite() || self.probe.origin == self.probe.target {
            self.stop(Termination::Degenerate);
            return None;
        }
        self.remaining -= 1;

        match nearest_hit(self.scene, &self.probe, self.excluded) {
            None => {
                self.stop(Termination::Escaped);
                Some(self.probe)
            }
            Some((_, collision)) if !collision.point.is_finite() => {
                self.stop(Termination::Degenerate);
                None
            }
            Some((index, collision)) => {
                let realised = Segment::new(self.probe.origin, collision.point);
                self.probe = Segment::new(
                    collision.point,
                    collision.point + collision.direction.with_len(self.reach),
                );
                self.excluded = Some(index);
                Some(realised)
            }
        }
    }
}

/// The realised polyline of one ray.
#[derive(Debug, Clone)]
pub struct BouncePath {
    pub vertices: Vec<Vec2>,
    pub termination: Termination,
}

impl BouncePath {
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vertices
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
    }

    /// The final free segment of an escaped ray.
    pub fn exit(&self) -> Option<Segment> {
        match self.termination {
            Termination::Escaped => self.segments().last(),
            _ => None,
        }
    }
}

/// Runs a chain to completion and collects its vertices.
pub fn trace(scene: &Scene, ray: Segment, params: BounceParams) -> BouncePath {
    let mut vertices = vec![ray.origin];
    let mut bounces = simulate(scene, ray, params);
    for segment in bounces.by_ref() {
        vertices.push(segment.target);
    }
    BouncePath {
        vertices,
        // an exhausted iterator always records why it stopped
        termination: bounces.termination().unwrap_or(Termination::Exhausted),
    }
}
