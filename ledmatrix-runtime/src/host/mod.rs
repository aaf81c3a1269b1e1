use std::time::Duration;

use eyre::WrapErr;

use crate::render::{ChangeSet, FrameBuffer};

/// Position in a rotation of panels: `index` out of `count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cycle {
    pub index: usize,
    pub count: usize,
}
impl Cycle {
    pub fn new(index: usize, count: usize) -> Self {
        Self { index, count }
    }

    /// The following panel, wrapping around; `None` for an empty rotation.
    pub fn next(self) -> Option<Self> {
        (self.count > 0).then(|| Self {
            index: (self.index + 1) % self.count,
            count: self.count,
        })
    }
}

/// What a [`Scene`] asks of the loop after drawing a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameControl {
    /// Wait this long before drawing the next frame
    pub sleep: Option<Duration>,

    /// The panel just drawn. The next frame receives the one after it.
    pub cycle: Option<Cycle>,
}

/// The user's draw callback.
pub trait Scene {
    /// Draw a frame into `buffer`, which starts out black.
    /// `cycle` is whatever the previous frame's [`FrameControl::cycle`] advanced to.
    fn draw(&mut self, buffer: &mut FrameBuffer, cycle: Option<Cycle>)
        -> eyre::Result<FrameControl>;
}

impl<F> Scene for F
where
    F: FnMut(&mut FrameBuffer, Option<Cycle>) -> eyre::Result<FrameControl>,
{
    fn draw(
        &mut self,
        buffer: &mut FrameBuffer,
        cycle: Option<Cycle>,
    ) -> eyre::Result<FrameControl> {
        self(buffer, cycle)
    }
}

/// Whatever sets pixels on the physical panel.
pub trait Driver {
    /// Only ever called with a non-empty change set
    fn write(&mut self, changes: &ChangeSet) -> eyre::Result<()>;
}

/// Outcome of a single [`MatrixLoop::step`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Pixels written to the driver
    pub changed: usize,
    pub sleep: Option<Duration>,
}

/// Owns the pair of buffers the render loop needs:
/// `current`, which each frame is drawn into, and `cache`, what the panel is showing.
///
/// A step is draw, diff, write, apply, so it must not be interleaved with another step on the same loop.
pub struct MatrixLoop {
    current: FrameBuffer,
    cache: FrameBuffer,
    cycle: Option<Cycle>,
}
impl MatrixLoop {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self {
            current: FrameBuffer::new(rows, cols),
            cache: FrameBuffer::new(rows, cols),
            cycle: None,
        }
    }

    /// Start a rotation of panels before the first frame
    pub fn with_cycle(mut self, cycle: Cycle) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// What the panel is showing, as far as the loop knows
    pub fn cache(&self) -> &FrameBuffer {
        &self.cache
    }

    pub fn cycle(&self) -> Option<Cycle> {
        self.cycle
    }

    /// Draws one frame and sends whatever changed to `driver`.
    ///
    /// If the scene or the driver fails, the cache is left as it was,
    /// so the next step sends the full difference again.
    pub fn step(
        &mut self,
        scene: &mut impl Scene,
        driver: &mut impl Driver,
    ) -> eyre::Result<StepReport> {
        let control = match scene.draw(&mut self.current, self.cycle) {
            Ok(control) => control,
            Err(err) => {
                self.current.clear();
                return Err(err.wrap_err("drawing frame"));
            }
        };

        let changes = self.current.diff(&self.cache)?;
        self.current.clear();

        if !changes.is_empty() {
            driver
                .write(&changes)
                .wrap_err_with(|| format!("writing {} changed pixels", changes.len()))?;
            self.cache.apply(&changes);
        }
        log::debug!("frame done, {} pixels changed", changes.len());

        if let Some(cycle) = control.cycle {
            self.cycle = cycle.next();
            log::trace!("cycle advanced to {:?}", self.cycle);
        }

        Ok(StepReport {
            changed: changes.len(),
            sleep: control.sleep,
        })
    }

    /// Steps `frames` times, sleeping in between as the scene requests.
    pub fn run(
        &mut self,
        scene: &mut impl Scene,
        driver: &mut impl Driver,
        frames: usize,
    ) -> eyre::Result<()> {
        for _ in 0..frames {
            let report = self.step(scene, driver)?;
            if let Some(sleep) = report.sleep {
                std::thread::sleep(sleep);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(Cycle::new(0, 3).next(), Some(Cycle::new(1, 3)));
        assert_eq!(Cycle::new(2, 3).next(), Some(Cycle::new(0, 3)));
        assert_eq!(Cycle::new(0, 0).next(), None);
    }
}
