use std::{cell::Cell, time::Duration};

use ledmatrix::{
    graphics::{Align, Color, Font, FontRegistry},
    host::{Cycle, Driver, FrameControl, MatrixLoop},
    layout::Address,
    render::{text::TextRenderer, ChangeSet, FrameBuffer},
};

/// Mirrors the panel and remembers every change set it was handed
#[derive(Default)]
struct RecordingDriver {
    writes: Vec<ChangeSet>,
    panel: Option<FrameBuffer>,
    fail: bool,
}
impl Driver for RecordingDriver {
    fn write(&mut self, changes: &ChangeSet) -> eyre::Result<()> {
        if self.fail {
            eyre::bail!("panel unplugged");
        }
        if let Some(panel) = &mut self.panel {
            panel.apply(changes);
        }
        self.writes.push(changes.clone());
        Ok(())
    }
}

#[test]
fn test_only_changes_reach_the_driver() {
    let mut matrix = MatrixLoop::new(8, 8);
    let mut driver = RecordingDriver {
        panel: Some(FrameBuffer::new(8, 8)),
        ..Default::default()
    };
    let col = Cell::new(0);
    let mut scene = |buffer: &mut FrameBuffer, _: Option<Cycle>| -> eyre::Result<FrameControl> {
        buffer.draw_line(Address::new(0, 0), Address::new(0, 7), Color::BLUE);
        buffer.draw_dot(Address::new(4, col.get()), Color::RED);
        Ok(FrameControl::default())
    };

    let first = matrix.step(&mut scene, &mut driver).unwrap();
    assert_eq!(first.changed, 9);

    // same picture again: nothing to send
    let second = matrix.step(&mut scene, &mut driver).unwrap();
    assert_eq!(second.changed, 0);
    assert_eq!(driver.writes.len(), 1);

    // moving the dot turns one pixel off and another on
    col.set(3);
    let third = matrix.step(&mut scene, &mut driver).unwrap();
    assert_eq!(third.changed, 2);
    let last = driver.writes.last().unwrap();
    let moved: Vec<_> = last.iter().map(|p| (p.address(), p.color())).collect();
    assert_eq!(
        moved,
        vec![
            (Address::new(4, 0), Color::BLACK),
            (Address::new(4, 3), Color::RED)
        ]
    );

    assert_eq!(driver.panel.as_ref(), Some(matrix.cache()));
}

#[test]
fn test_frames_start_black() {
    let mut matrix = MatrixLoop::new(4, 4);
    let mut driver = RecordingDriver::default();
    let mut frame = 0;
    let mut scene = |buffer: &mut FrameBuffer, _: Option<Cycle>| -> eyre::Result<FrameControl> {
        assert!(buffer.pixels().iter().all(|p| p.color().is_black()));
        if frame == 0 {
            buffer.draw_box(Address::new(0, 0), Address::new(3, 3), Color::WHITE);
        }
        frame += 1;
        Ok(FrameControl::default())
    };

    assert_eq!(matrix.step(&mut scene, &mut driver).unwrap().changed, 16);
    // nothing drawn the second time, so everything goes dark
    assert_eq!(matrix.step(&mut scene, &mut driver).unwrap().changed, 16);
    assert!(matrix
        .cache()
        .pixels()
        .iter()
        .all(|p| p.color().is_black()));
}

#[test]
fn test_cycle_advances_between_frames() {
    let mut matrix = MatrixLoop::new(2, 2).with_cycle(Cycle::new(0, 3));
    let mut driver = RecordingDriver::default();
    let mut seen = Vec::new();
    let mut scene = |_: &mut FrameBuffer, cycle: Option<Cycle>| -> eyre::Result<FrameControl> {
        seen.push(cycle.map(|c| c.index));
        Ok(FrameControl {
            sleep: Some(Duration::from_millis(5)),
            cycle,
        })
    };

    for _ in 0..4 {
        let report = matrix.step(&mut scene, &mut driver).unwrap();
        assert_eq!(report.sleep, Some(Duration::from_millis(5)));
    }
    assert_eq!(seen, vec![Some(0), Some(1), Some(2), Some(0)]);
    assert_eq!(matrix.cycle(), Some(Cycle::new(1, 3)));
}

#[test]
fn test_failed_write_keeps_cache() {
    let mut matrix = MatrixLoop::new(3, 3);
    let mut driver = RecordingDriver {
        fail: true,
        ..Default::default()
    };
    let mut scene = |buffer: &mut FrameBuffer, _: Option<Cycle>| -> eyre::Result<FrameControl> {
        buffer.set(1, 1, Color::GREEN);
        Ok(FrameControl::default())
    };

    assert!(matrix.step(&mut scene, &mut driver).is_err());
    assert_eq!(matrix.cache(), &FrameBuffer::new(3, 3));

    // once the panel is back, the whole difference is sent again
    driver.fail = false;
    assert_eq!(matrix.step(&mut scene, &mut driver).unwrap().changed, 1);
}

#[test]
fn test_missing_glyph_stops_the_frame() {
    let mut fonts = FontRegistry::new();
    let handle = fonts.insert("builtin", Font::builtin());
    let mut matrix = MatrixLoop::new(8, 32);
    let mut driver = RecordingDriver::default();
    let mut scene = |buffer: &mut FrameBuffer, _: Option<Cycle>| -> eyre::Result<FrameControl> {
        let font = fonts.get(handle)?;
        TextRenderer::new(font)
            .align(Align::Center)
            .draw(buffer, Address::new(6, 16), "lower case")?;
        Ok(FrameControl::default())
    };

    let err = matrix.step(&mut scene, &mut driver).unwrap_err();
    assert!(format!("{err:?}").contains("no glyph for 'l'"));
    assert!(driver.writes.is_empty());
}

#[test]
fn test_builtin_text_on_panel() {
    let font = Font::builtin();
    let mut buffer = FrameBuffer::new(7, 12);
    let extent = TextRenderer::new(&font)
        .draw(&mut buffer, Address::new(5, 1), "HI!")
        .unwrap();

    assert_eq!(extent.width, 11);
    assert_eq!(
        buffer.render_text_rows(),
        vec![
            "------------",
            "-#-#-###--#-",
            "-#-#--#---#-",
            "-###--#---#-",
            "-#-#--#-----",
            "-#-#-###--#-",
            "------------",
        ]
    );
}
