//! Jittered grid of streamline seed points.

use crate::prng::JitterRng;
use crate::viewport::Viewport;
use glam::DVec2;

/// Maximum jitter as a fraction of the cell size, in each direction.
pub const JITTER_FRACTION: f64 = 0.25;

/// Lays out `density × density` seeds, one per grid cell.
///
/// Each seed starts at its cell centre and is moved by a uniform offset of up
/// to ±[`JITTER_FRACTION`] of the cell size on each axis, which breaks up the
/// regular look of grid-aligned streamlines. Seeds are ordered column by
/// column: index `k` lives in cell `(k / density, k % density)`.
pub fn generate_seeds<R: JitterRng + ?Sized>(
    density: usize,
    viewport: &Viewport,
    rng: &mut R,
) -> Vec<DVec2> {
    if density == 0 {
        return Vec::new();
    }
    let cell = DVec2::new(
        viewport.width / density as f64,
        viewport.height / density as f64,
    );
    let jitter = cell * JITTER_FRACTION;

    let mut seeds = Vec::new();
    for i in 0..density {
        for j in 0..density {
            let centre = DVec2::new((i as f64 + 0.5) * cell.x, (j as f64 + 0.5) * cell.y);
            let offset = DVec2::new(rng.jitter(jitter.x), rng.jitter(jitter.y));
            seeds.push(centre + offset);
        }
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::Xorshift64;

    #[test]
    fn density_15_on_800x600_gives_225_seeds_inside_their_cells() {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        let mut rng = Xorshift64::new(42);
        let seeds = generate_seeds(15, &viewport, &mut rng);
        assert_eq!(seeds.len(), 225);

        let cw = 800.0 / 15.0;
        let ch = 600.0 / 15.0;
        for (k, s) in seeds.iter().enumerate() {
            let (i, j) = ((k / 15) as f64, (k % 15) as f64);
            let cx = (i + 0.5) * cw;
            let cy = (j + 0.5) * ch;
            assert!((s.x - cx).abs() <= 0.25 * cw + 1e-9, "seed {k} x = {}", s.x);
            assert!((s.y - cy).abs() <= 0.25 * ch + 1e-9, "seed {k} y = {}", s.y);
            assert!(viewport.contains(*s));
        }
    }

    #[test]
    fn zero_density_gives_no_seeds() {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        assert!(generate_seeds(0, &viewport, &mut Xorshift64::new(1)).is_empty());
    }

    #[test]
    fn same_rng_seed_same_layout() {
        let viewport = Viewport::new(640.0, 480.0).unwrap();
        let a = generate_seeds(10, &viewport, &mut Xorshift64::new(99));
        let b = generate_seeds(10, &viewport, &mut Xorshift64::new(99));
        assert_eq!(a, b);
        let c = generate_seeds(10, &viewport, &mut Xorshift64::new(100));
        assert_ne!(a, c);
    }

    #[test]
    fn seeds_are_actually_jittered() {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        let seeds = generate_seeds(4, &viewport, &mut Xorshift64::new(5));
        let on_centre = seeds
            .iter()
            .filter(|s| (s.x - 100.0).rem_euclid(200.0) == 0.0)
            .count();
        assert!(on_centre < seeds.len());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn seed_count_is_density_squared_and_on_canvas(
                density in 1_usize..40,
                seed: u64,
                w in 10.0_f64..2000.0,
                h in 10.0_f64..2000.0,
            ) {
                let viewport = Viewport::new(w, h).unwrap();
                let seeds = generate_seeds(density, &viewport, &mut Xorshift64::new(seed));
                prop_assert_eq!(seeds.len(), density * density);
                for s in &seeds {
                    prop_assert!(viewport.contains(*s), "seed {s:?} off canvas");
                }
            }
        }
    }
}
