//! Device selection menu.

use crate::camera::{select_format, Device};

/// Menu entries built from the enumerated devices, one per device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMenu {
    items: Vec<String>,
    selected: usize,
}

impl DeviceMenu {
    pub fn new(devices: &[Device]) -> Self {
        Self {
            items: devices.iter().map(|d| d.name.clone()).collect(),
            selected: 0,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_title(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Select entry `index`. Returns the index if it changed the selection.
    pub fn select(&mut self, index: usize) -> Option<usize> {
        if index >= self.items.len() || index == self.selected {
            return None;
        }
        self.selected = index;
        Some(index)
    }

    /// Select the next entry, wrapping around.
    pub fn select_next(&mut self) -> Option<usize> {
        if self.items.len() < 2 {
            return None;
        }
        self.select((self.selected + 1) % self.items.len())
    }

    /// Select the previous entry, wrapping around.
    pub fn select_previous(&mut self) -> Option<usize> {
        if self.items.len() < 2 {
            return None;
        }
        let len = self.items.len();
        self.select((self.selected + len - 1) % len)
    }
}

/// Print the device list with each device's formats.
///
/// The format `start` would pick is marked with `*`.
pub fn print_devices(devices: &[Device]) {
    println!("Video Devices:");
    if devices.is_empty() {
        println!("  (none found)");
        return;
    }

    for (i, device) in devices.iter().enumerate() {
        println!("  [{}] {}", i, device);
        let preferred = select_format(&device.formats);
        for format in &device.formats {
            let marker = if preferred == Some(format) { '*' } else { ' ' };
            println!("     {} {}", marker, format);
        }
    }
}
