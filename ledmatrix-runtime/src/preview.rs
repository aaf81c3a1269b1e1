use std::{
    fmt::Display,
    num::NonZeroU32,
    rc::Rc,
    time::{Duration, Instant},
};

use ledmatrix::{
    host::{Driver, MatrixLoop, Scene},
    layout::Address,
    render::{ChangeSet, FrameBuffer},
};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

/// How long to wait when a scene doesn't ask for a particular delay
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// `softbuffer` and `winit` errors aren't all `Send + Sync`, so they can't go into `eyre` directly
fn platform(err: impl Display) -> eyre::Report {
    eyre::eyre!("{err}")
}

/// Stands in for the panel: remembers the color of every LED, as `softbuffer` pixels.
struct WindowDriver {
    leds: Vec<u32>,
    cols: usize,
}
impl WindowDriver {
    fn new(rows: i32, cols: i32) -> Self {
        let cols = cols.max(0) as usize;
        Self {
            leds: vec![0; rows.max(0) as usize * cols],
            cols,
        }
    }

    /// Row-major index of the LED at `address`, if the panel has one there
    fn index(&self, address: Address) -> Option<usize> {
        let row = usize::try_from(address.row).ok()?;
        let col = usize::try_from(address.col).ok()?;
        (col < self.cols)
            .then(|| row * self.cols + col)
            .filter(|&index| index < self.leds.len())
    }

    fn led(&self, row: usize, col: usize) -> u32 {
        if col >= self.cols {
            return 0;
        }
        self.leds.get(row * self.cols + col).copied().unwrap_or(0)
    }
}
impl Driver for WindowDriver {
    fn write(&mut self, changes: &ChangeSet) -> eyre::Result<()> {
        for pixel in changes {
            if let Some(index) = self.index(pixel.address()) {
                self.leds[index] = pixel.color().to_packed();
            }
        }
        Ok(())
    }
}

/// Blits the LEDs into the window, `scale` pixels each, with a dark gap between them
fn present(
    surface: &mut softbuffer::Surface<Rc<Window>, Rc<Window>>,
    window: &Window,
    driver: &WindowDriver,
    scale: u32,
) -> eyre::Result<()> {
    let size = window.inner_size();
    let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
    else {
        return Ok(());
    };
    surface.resize(width, height).map_err(platform)?;

    let mut buffer = surface.buffer_mut().map_err(platform)?;
    let gap = u32::from(scale >= 4);
    for y in 0..size.height {
        for x in 0..size.width {
            let in_gap = x % scale >= scale - gap || y % scale >= scale - gap;
            buffer[(y * size.width + x) as usize] = if in_gap {
                0
            } else {
                driver.led((y / scale) as usize, (x / scale) as usize)
            };
        }
    }
    buffer.present().map_err(platform)?;
    Ok(())
}

pub fn run_window(
    mut matrix: MatrixLoop,
    mut scene: impl Scene + 'static,
    scale: u32,
) -> eyre::Result<()> {
    let scale = scale.max(1);
    let (rows, cols) = (matrix.cache().rows(), matrix.cache().cols());
    let mut driver = WindowDriver::new(rows, cols);

    let event_loop = EventLoop::new().map_err(platform)?;
    let window = WindowBuilder::new()
        .with_title("LED Matrix")
        .with_inner_size(PhysicalSize::new(cols as u32 * scale, rows as u32 * scale))
        .with_resizable(false)
        .build(&event_loop)
        .map_err(platform)?;
    let window = Rc::new(window);

    let context = softbuffer::Context::new(window.clone()).map_err(platform)?;
    let mut surface = softbuffer::Surface::new(&context, window.clone()).map_err(platform)?;

    let mut next_frame = Instant::now();
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::RedrawRequested => {
                    if let Err(err) = present(&mut surface, &window, &driver, scale) {
                        log::error!("{err:?}");
                        elwt.exit();
                    }
                }
                _ => (),
            },
            Event::AboutToWait => {
                if Instant::now() >= next_frame {
                    match matrix.step(&mut scene, &mut driver) {
                        Ok(report) => {
                            next_frame = Instant::now() + report.sleep.unwrap_or(FRAME_INTERVAL);
                            if report.changed > 0 {
                                window.request_redraw();
                            }
                        }
                        Err(err) => {
                            log::error!("{err:?}");
                            elwt.exit();
                        }
                    }
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(next_frame));
            }
            _ => (),
        })
        .map_err(platform)
}

/// Keeps its own copy of the panel and logs it after every change
struct LogDriver {
    panel: FrameBuffer,
}
impl Driver for LogDriver {
    fn write(&mut self, changes: &ChangeSet) -> eyre::Result<()> {
        self.panel.apply(changes);
        log::info!("{} pixels changed", changes.len());
        for row in self.panel.render_text_rows() {
            log::info!("{row}");
        }
        Ok(())
    }
}

pub fn run_headless(
    mut matrix: MatrixLoop,
    mut scene: impl Scene,
    frames: usize,
) -> eyre::Result<()> {
    let mut driver = LogDriver {
        panel: FrameBuffer::new(matrix.cache().rows(), matrix.cache().cols()),
    };
    matrix.run(&mut scene, &mut driver, frames)
}

#[cfg(test)]
mod tests {
    use ledmatrix::{graphics::Color, render::Pixel};

    use super::*;

    #[test]
    fn test_window_driver_maps_addresses() {
        let mut driver = WindowDriver::new(2, 3);
        let changes: ChangeSet = [
            Pixel::new(Address::new(0, 0), Color::RED),
            Pixel::new(Address::new(1, 2), Color::rgb(0x12, 0x34, 0x56)),
            Pixel::new(Address::new(0, 3), Color::WHITE),
            Pixel::new(Address::new(1, -1), Color::WHITE),
            Pixel::new(Address::new(2, 0), Color::WHITE),
        ]
        .into_iter()
        .collect();
        driver.write(&changes).unwrap();

        assert_eq!(driver.leds, vec![0xff0000, 0, 0, 0, 0, 0x123456]);
        assert_eq!(driver.led(1, 2), 0x123456);
        assert_eq!(driver.led(0, 3), 0);
        assert_eq!(driver.led(5, 0), 0);
    }

    #[test]
    fn test_log_driver_mirrors_panel() {
        let mut current = FrameBuffer::new(3, 4);
        current.set(2, 1, Color::BLUE);
        let changes = current.diff(&FrameBuffer::new(3, 4)).unwrap();

        let mut driver = LogDriver {
            panel: FrameBuffer::new(3, 4),
        };
        driver.write(&changes).unwrap();
        assert_eq!(driver.panel, current);
    }
}
