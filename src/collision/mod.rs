//! Time-of-impact solver for spheres moving at constant per-frame speed
//! inside a set of static boundary planes.
//!
//! Each fixed time step runs [`resolve`] and then advances every sphere with
//! [`MovingSphere::advance`]. A contact at fraction `t` of the frame splits
//! the frame's motion in two: advance to the contact, reflect the direction
//! about the contact normal, advance the remainder. There is no multi-bounce
//! continuation within a single step.

use glam::Vec3;
use rand::{distributions::Uniform, prelude::Distribution, Rng};

use crate::geometry::{BoundingSphere, Plane, Ray3};
use crate::math::{EPSILON, Matrix4x4, Point3, Vec3Ext};

/// A surface hit within the current frame: the fraction of the frame's
/// motion completed at contact and the plane to reflect about. A time of 0
/// means the contact exists at the start of the frame (overlap recovery).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub time: f32,
    pub plane: Plane,
}

/// A sphere moving at `speed` units per frame along a unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingSphere {
    pub position: Point3,
    pub direction: Vec3,
    pub speed: f32,
    pub radius: f32,
    contact: Option<Contact>,
}

impl MovingSphere {
    pub fn new(position: Point3, direction: Vec3, speed: f32, radius: f32) -> Self {
        Self {
            position,
            direction: direction.normalize_or_keep(),
            speed,
            radius,
            contact: None,
        }
    }

    /// Randomized sphere matching the bouncing-ball demo setup: x and y in
    /// [-40, 40], z in [25, 75], radius in [3, 7], a uniform random unit
    /// direction and a speed of 5 to 15 units per second converted to
    /// units per frame.
    pub fn random<R: Rng>(rng: &mut R, fps: f32) -> Self {
        let unit = Uniform::new(0.0f32, 1.0);
        let position = Point3::new(
            Uniform::new(-40.0, 40.0).sample(rng),
            Uniform::new(-40.0, 40.0).sample(rng),
            Uniform::new(25.0, 75.0).sample(rng),
        );
        let direction = Vec3::new(unit.sample(rng), unit.sample(rng), unit.sample(rng))
            .normalize_or_keep();
        let speed = Uniform::new(5.0f32, 15.0).sample(rng) / fps;
        let radius = Uniform::new(3.0f32, 7.0).sample(rng);
        Self::new(position, direction, speed, radius)
    }

    pub fn contact(&self) -> Option<&Contact> {
        self.contact.as_ref()
    }

    pub fn set_contact(&mut self, contact: Contact) {
        self.contact = Some(contact);
    }

    pub fn clear_contact(&mut self) {
        self.contact = None;
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.position, self.radius)
    }

    /// Modeling transform for drawing a unit sphere at this ball's position
    /// and size.
    pub fn transform(&self) -> Matrix4x4 {
        let mut m = Matrix4x4::new();
        m.translate(self.position.x(), self.position.y(), self.position.z());
        m.scale(self.radius, self.radius, self.radius);
        m
    }

    /// Time of impact against another moving sphere within this frame.
    ///
    /// If the spheres already overlap (a contact missed in a prior frame),
    /// the contact is immediate: both get time 0 and opposing normals along
    /// the line between centers. Otherwise the test reduces to a ray from
    /// this sphere along the relative velocity against a stationary sphere
    /// of combined radius, accepting a hit only within this frame's
    /// relative displacement.
    ///
    /// Returns the contact for `self` and the contact for `other`.
    pub fn intersect_sphere(&self, other: &MovingSphere) -> Option<(Contact, Contact)> {
        let between = other.position - self.position;
        let dist = between.length();
        if dist < other.radius + self.radius {
            let n = if dist > EPSILON {
                between * (1.0 / dist)
            } else {
                // Coincident centers; any separating axis will do.
                Vec3::X
            };
            let ours = Contact {
                time: 0.0,
                plane: Plane::from_point_normal(self.position, -n),
            };
            let theirs = Contact {
                time: 0.0,
                plane: Plane::from_point_normal(other.position, n),
            };
            return Some((ours, theirs));
        }

        let relative = self.direction * self.speed - other.direction * other.speed;
        let rel_len = relative.length();
        if rel_len < EPSILON {
            return None;
        }
        let ray = Ray3::new(self.position, relative * (1.0 / rel_len));
        let combined = BoundingSphere::new(other.position, other.radius + self.radius);

        let t = ray.intersect_sphere(&combined)?;
        if t <= EPSILON || t >= rel_len + EPSILON {
            return None;
        }

        // Rescale the ray parameter into a fraction of this frame, then
        // rebuild both centers at the moment of impact.
        let t = t / rel_len;
        let c1 = self.position + self.direction * (self.speed * t);
        let c2 = other.position + other.direction * (other.speed * t);

        // Contact point and separating normal lie on the line between the
        // centers; each sphere sees the normal pointing away from the other.
        let n = (c2 - c1).normalize_or_keep();
        let contact_pt = c1 + n * self.radius;

        let ours = Contact {
            time: t,
            plane: Plane::from_point_normal(contact_pt, -n),
        };
        let theirs = Contact {
            time: t,
            plane: Plane::from_point_normal(contact_pt, n),
        };
        Some((ours, theirs))
    }

    /// Fraction of this frame's motion at which the sphere surface reaches
    /// the plane, from the signed distances at the start and end of the
    /// frame. `None` when the sphere stays clear of the plane. A sphere
    /// already touching or past the plane reports time 0.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let start = plane.solve(self.position);
        let end = plane.solve(self.position + self.direction * self.speed);

        if start > self.radius && end > self.radius {
            return None;
        }

        let travel = start - end;
        if travel.abs() < EPSILON {
            // Moving parallel to the plane while within a radius of it.
            return (start <= self.radius).then_some(0.0);
        }
        Some(((start - self.radius) / travel).max(0.0))
    }

    /// Advance one frame of motion, consuming any contact found by
    /// [`resolve`]: move to the contact, reflect the travel direction about
    /// the contact plane's normal, then cover the remaining fraction of the
    /// frame along the new direction.
    pub fn advance(&mut self) {
        match self.contact.take() {
            Some(c) if c.time < 1.0 => {
                self.position = self.position + self.direction * (self.speed * c.time);
                self.direction = c.plane.reflect(self.direction);
                self.position = self.position + self.direction * (self.speed * (1.0 - c.time));
            }
            _ => {
                self.position = self.position + self.direction * self.speed;
            }
        }
    }
}

/// One frame of contact detection over every moving sphere.
///
/// Pairwise tests use a first-found policy: once a sphere is marked it
/// tests no further pairs, even if a nearer contact exists. This is a
/// deliberate simplification carried over from the original simulation,
/// not an oversight; changing it changes the observable behavior.
/// Spheres with no pairwise contact then take the nearest boundary-plane
/// hit with a time inside this frame.
pub fn resolve(spheres: &mut [MovingSphere], planes: &[Plane]) {
    for s in spheres.iter_mut() {
        s.clear_contact();
    }

    for i in 0..spheres.len() {
        if spheres[i].contact().is_some() {
            continue;
        }
        for j in (i + 1)..spheres.len() {
            if let Some((ours, theirs)) = spheres[i].intersect_sphere(&spheres[j]) {
                spheres[i].set_contact(ours);
                spheres[j].set_contact(theirs);
                break;
            }
        }
    }

    for s in spheres.iter_mut() {
        if s.contact().is_some() {
            continue;
        }
        let mut nearest: Option<Contact> = None;
        for plane in planes {
            if let Some(t) = s.intersect_plane(plane) {
                if t < nearest.map_or(1.0, |c| c.time) {
                    nearest = Some(Contact { time: t, plane: *plane });
                }
            }
        }
        if let Some(c) = nearest {
            s.set_contact(c);
        }
    }
}
