#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::Cursor,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use flow_assets::{
    AssetLoader, DecoderSet, ImageFormat, LoadContext, RawImage,
    resources::task::{LoadTask, TaskLauncher},
};

pub(crate) fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Asset loader over an in-memory file table that counts reads.
#[derive(Default)]
pub(crate) struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    reads: AtomicUsize,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), bytes);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl AssetLoader for MemoryLoader {
    fn file_exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn read_binary(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{name} vanished"))
    }
}

/// Runs every task on the calling thread before `launch` returns.
pub(crate) struct InlineLauncher;

impl TaskLauncher for InlineLauncher {
    fn launch(&self, task: LoadTask) {
        task();
    }
}

/// Keeps tasks until the test releases them, so the in-flight state can be observed.
#[derive(Default)]
pub(crate) struct ParkedLauncher {
    tasks: Mutex<Vec<LoadTask>>,
}

impl ParkedLauncher {
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn run_all(&self) {
        let tasks: Vec<LoadTask> = self.tasks.lock().unwrap().drain(..).collect();
        for task in tasks {
            task();
        }
    }

    pub fn drop_all(&self) {
        self.tasks.lock().unwrap().clear();
    }
}

impl TaskLauncher for ParkedLauncher {
    fn launch(&self, task: LoadTask) {
        self.tasks.lock().unwrap().push(task);
    }
}

/// A decoder set whose parsers report which format handled the bytes via `width`.
pub(crate) fn tagging_decoders() -> DecoderSet {
    ImageFormat::ALL
        .iter()
        .enumerate()
        .fold(DecoderSet::empty(), |set, (tag, &format)| {
            set.with(format, move |_: &[u8]| -> anyhow::Result<RawImage> {
                Ok(RawImage::packed(tag as u32 + 1, 1, 32, vec![0; (tag + 1) * 4]))
            })
        })
}

/// The tag `tagging_decoders` assigns to `format`.
pub(crate) fn tag_of(format: ImageFormat) -> u32 {
    ImageFormat::ALL.iter().position(|&f| f == format).unwrap() as u32 + 1
}

/// A parser that counts its invocations and returns a 2x2 32-bit image.
pub(crate) fn counting_decoders(calls: Arc<AtomicUsize>) -> DecoderSet {
    DecoderSet::empty().with(ImageFormat::Png, move |_: &[u8]| -> anyhow::Result<RawImage> {
        calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(RawImage::packed(2, 2, 32, vec![7; 16]))
    })
}

/// A `width` x `height` 24-bit image whose pixel bytes count up from 0 (wrapping),
/// with `pitch - width * 3` padding bytes of `0xEE` per row.
pub(crate) fn rgb24(width: u32, height: u32, pitch: u32) -> RawImage {
    pattern_image(width, height, pitch, 3, 24)
}

pub(crate) fn rgb48(width: u32, height: u32, pitch: u32) -> RawImage {
    pattern_image(width, height, pitch, 6, 48)
}

fn pattern_image(width: u32, height: u32, pitch: u32, bytes: usize, bit_count: u16) -> RawImage {
    let mut data = vec![0xEE; pitch as usize * height as usize];
    let mut counter: u8 = 0;
    for row in 0..height as usize {
        let start = row * pitch as usize;
        for byte in &mut data[start..start + width as usize * bytes] {
            *byte = counter;
            counter = counter.wrapping_add(1);
        }
    }
    RawImage::new(width, height, bit_count, pitch, data)
}

/// An RGB8 PNG encoded with the `image` crate.
pub(crate) fn png_rgb8(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 200]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub(crate) fn context(loader: impl AssetLoader + 'static) -> LoadContext {
    LoadContext::new(loader).with_launcher(InlineLauncher)
}
