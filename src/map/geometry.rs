use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Fill rings given in pixel space using the even-odd rule.
/// Scanlines sample pixel centers, so shared edges are not drawn twice.
pub fn fill_rings(canvas: &mut BrailleCanvas, rings: &[Vec<(f64, f64)>]) {
    let max_y = canvas.pixel_height() as f64 - 1.0;
    let max_x = canvas.pixel_width() as i32 - 1;
    if max_y < 0.0 || max_x < 0 {
        return;
    }

    let (lo, hi) = rings
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    if lo > hi {
        return;
    }
    let y_start = lo.floor().max(0.0) as i32;
    let y_end = hi.ceil().min(max_y) as i32;

    let mut crossings: Vec<f64> = Vec::new();
    for y in y_start..=y_end {
        let sy = y as f64 + 0.5;
        crossings.clear();

        for ring in rings {
            let n = ring.len();
            for i in 0..n {
                let (x0, y0) = ring[i];
                let (x1, y1) = ring[(i + 1) % n];
                if (y0 <= sy) != (y1 <= sy) {
                    crossings.push(x0 + (sy - y0) * (x1 - x0) / (y1 - y0));
                }
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let x_start = ((span[0] - 0.5).ceil() as i32).max(0);
            let x_end = ((span[1] - 0.5).floor() as i32).min(max_x);
            for x in x_start..=x_end {
                canvas.set_pixel(x as usize, y as usize);
            }
        }
    }
}

/// Even-odd point in polygon test over all rings (holes included)
pub fn contains_point(rings: &[Vec<(f64, f64)>], x: f64, y: f64) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        for i in 0..n {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            if (y0 > y) != (y1 > y) && x < x0 + (y - y0) * (x1 - x0) / (y1 - y0) {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        // Top dot pair of every cell
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]
    }

    #[test]
    fn test_fill_square_sets_every_dot() {
        let mut canvas = BrailleCanvas::new(2, 1);
        fill_rings(&mut canvas, &[square(0.0, 0.0, 4.0, 4.0)]);
        assert_eq!(canvas.to_string(), "⣿⣿");
    }

    #[test]
    fn test_fill_respects_hole() {
        let mut canvas = BrailleCanvas::new(3, 3);
        fill_rings(
            &mut canvas,
            &[square(0.0, 0.0, 6.0, 12.0), square(2.0, 4.0, 4.0, 8.0)],
        );
        let rows: Vec<String> = canvas.rows().collect();
        assert_eq!(rows[0], "⣿⣿⣿");
        assert_eq!(rows[1], "⣿⠀⣿");
    }

    #[test]
    fn test_fill_clips_offscreen() {
        let mut canvas = BrailleCanvas::new(1, 1);
        fill_rings(&mut canvas, &[square(-50.0, -50.0, 50.0, 50.0)]);
        assert_eq!(canvas.to_string(), "⣿");
        let mut empty = BrailleCanvas::new(1, 1);
        fill_rings(&mut empty, &[square(10.0, 10.0, 20.0, 20.0)]);
        assert_eq!(empty.to_string(), "⠀");
    }

    #[test]
    fn test_contains_point() {
        let rings = vec![square(0.0, 0.0, 10.0, 10.0), square(4.0, 4.0, 6.0, 6.0)];
        assert!(contains_point(&rings, 1.0, 1.0));
        assert!(!contains_point(&rings, 5.0, 5.0));
        assert!(!contains_point(&rings, 11.0, 5.0));
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        // Left column: 0x01 | 0x02 | 0x04 | 0x40 in both cells
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }
}
