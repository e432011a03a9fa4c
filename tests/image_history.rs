use std::env;

use doodlepix::error::PersistenceError;
use doodlepix::generation::GenerationConfig;
use doodlepix::image_history::ImageHistory;
use image::{Rgba, RgbaImage};
use uuid::Uuid;

fn solid(value: u8) -> RgbaImage {
    RgbaImage::from_pixel(4, 4, Rgba([value, value, value, 255]))
}

fn history_of(count: u8) -> (ImageHistory, Vec<Uuid>) {
    let mut images = ImageHistory::new();
    let ids = (0..count)
        .map(|i| {
            let id = Uuid::new_v4();
            images.push(id, solid(i), GenerationConfig::default());
            id
        })
        .collect();
    (images, ids)
}

#[test]
fn test_empty_history() {
    let mut images = ImageHistory::new();
    assert!(images.current().is_none());
    assert_eq!(images.position(), None);
    assert!(images.previous().is_none());
    assert!(images.next().is_none());
    assert!(!images.can_go_previous());
    assert!(!images.can_go_next());
    assert!(images.delete_current().is_none());

    let path = env::temp_dir().join(format!("doodlepix-empty-{}.png", Uuid::new_v4()));
    assert!(matches!(
        images.save_current(&path),
        Err(PersistenceError::NothingToSave)
    ));
    assert!(!path.exists());
}

#[test]
fn test_push_selects_newest() {
    let (images, ids) = history_of(3);
    assert_eq!(images.len(), 3);
    assert_eq!(images.position(), Some(2));
    assert_eq!(images.current().unwrap().id, ids[2]);
    let indices: Vec<usize> = images.iter().map(|record| record.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_cursor_stays_in_bounds() {
    let (mut images, ids) = history_of(3);

    assert!(!images.can_go_next());
    assert_eq!(images.next().unwrap().id, ids[2]);

    images.previous();
    assert_eq!(images.previous().unwrap().id, ids[0]);
    assert!(!images.can_go_previous());
    assert_eq!(images.previous().unwrap().id, ids[0]);
    assert_eq!(images.position(), Some(0));

    assert_eq!(images.next().unwrap().id, ids[1]);
    assert!(images.can_go_previous());
    assert!(images.can_go_next());
}

#[test]
fn test_delete_current() {
    let (mut images, ids) = history_of(3);

    // Deleting the last image moves the cursor back
    assert_eq!(images.delete_current().unwrap().id, ids[2]);
    assert_eq!(images.current().unwrap().id, ids[1]);

    // Deleting from the front keeps the cursor on the next image
    images.previous();
    assert_eq!(images.delete_current().unwrap().id, ids[0]);
    assert_eq!(images.current().unwrap().id, ids[1]);
    assert_eq!(images.position(), Some(0));

    images.delete_current();
    assert!(images.is_empty());
    assert!(images.current().is_none());

    // Creation indices keep counting after deletions
    let position = images.push(Uuid::new_v4(), solid(9), GenerationConfig::default());
    assert_eq!(position, 0);
    assert_eq!(images.current().unwrap().index, 3);
}

#[test]
fn test_save_current_writes_png() {
    let (mut images, _) = history_of(2);
    images.previous();

    let path = env::temp_dir().join(format!("doodlepix-image-{}.png", Uuid::new_v4()));
    images.save_current(&path).unwrap();

    let saved = image::open(&path).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (4, 4));
    assert_eq!(saved.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    std::fs::remove_file(&path).unwrap();
}
