//! Device presets: phone resolutions for the shortcut workflow and desktop
//! canvas sizes for the maker

use serde_json::json;

use crate::options::RawOptions;

/// A phone screen in physical pixels, portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePreset {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceGroup {
    pub name: &'static str,
    pub models: &'static [DevicePreset],
}

/// A desktop canvas size with the cell size and gap that suit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopPreset {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
    pub gap: u32,
}

const fn phone(label: &'static str, width: u32, height: u32) -> DevicePreset {
    DevicePreset {
        label,
        width,
        height,
    }
}

pub const PHONE_GROUPS: &[DeviceGroup] = &[
    DeviceGroup {
        name: "Apple iPhone",
        models: &[
            phone("iPhone 16 Pro Max", 1320, 2868),
            phone("iPhone 16 Pro", 1206, 2622),
            phone("iPhone 16 Plus / 15 Plus / 15 Pro Max / 16 Pro Max (alt)", 1290, 2796),
            phone("iPhone 16 / 15 / 15 Pro", 1179, 2556),
            phone("iPhone 14 Pro Max / 13 Pro Max / 12 Pro Max", 1284, 2778),
            phone("iPhone 14 Pro / 13 Pro / 13 / 12 Pro / 14", 1170, 2532),
            phone("iPhone 13 mini / 12 mini", 1080, 2340),
            phone("iPhone SE (2nd/3rd gen)", 750, 1334),
            phone("iPhone 11 Pro / XS / X", 1125, 2436),
            phone("iPhone 11 Pro Max / XS Max", 1242, 2688),
            phone("iPhone 11 / XR", 828, 1792),
        ],
    },
    DeviceGroup {
        name: "Samsung Galaxy S",
        models: &[
            phone("Galaxy S25 Ultra", 1440, 3120),
            phone("Galaxy S25+ / S24+", 1080, 2340),
            phone("Galaxy S25 / S24 / S23", 1080, 2340),
            phone("Galaxy S24 Ultra / S23 Ultra", 1440, 3088),
            phone("Galaxy S22 Ultra", 1080, 2340),
            phone("Galaxy S22+ / S21+", 1080, 2400),
            phone("Galaxy S22 / S21 / S20", 1080, 2400),
        ],
    },
    DeviceGroup {
        name: "Samsung Galaxy A",
        models: &[
            phone("Galaxy A55 / A54 / A53", 1080, 2340),
            phone("Galaxy A35 / A34", 1080, 2340),
            phone("Galaxy A15 / A14", 1080, 2340),
        ],
    },
    DeviceGroup {
        name: "Google Pixel",
        models: &[
            phone("Pixel 9 Pro XL / 8 Pro", 1344, 2992),
            phone("Pixel 9 Pro / 9 / 8", 1080, 2400),
            phone("Pixel 9 Pro Fold", 1080, 2424),
            phone("Pixel 7 Pro / 6 Pro", 1440, 3120),
            phone("Pixel 7 / 6", 1080, 2400),
        ],
    },
    DeviceGroup {
        name: "Xiaomi",
        models: &[
            phone("Xiaomi 15 Ultra / 14 Ultra", 1440, 3200),
            phone("Xiaomi 15 / 14", 1080, 2400),
            phone("Redmi Note 13 / 12 Pro", 1080, 2400),
            phone("Redmi 13C / 12C", 720, 1600),
        ],
    },
    DeviceGroup {
        name: "OnePlus",
        models: &[
            phone("OnePlus 13 / 12", 1440, 3168),
            phone("OnePlus 13R / 12R", 1080, 2392),
            phone("OnePlus Nord 4 / CE 4", 1080, 2412),
        ],
    },
];

pub const DESKTOP_PRESETS: &[DesktopPreset] = &[
    DesktopPreset {
        label: "Mobile 1080×1920",
        width: 1080,
        height: 1920,
        cell_size: 10,
        gap: 2,
    },
    DesktopPreset {
        label: "Full HD 1920×1080",
        width: 1920,
        height: 1080,
        cell_size: 12,
        gap: 2,
    },
    DesktopPreset {
        label: "2K 2560×1440",
        width: 2560,
        height: 1440,
        cell_size: 14,
        gap: 2,
    },
    DesktopPreset {
        label: "4K 3840×2160",
        width: 3840,
        height: 2160,
        cell_size: 16,
        gap: 2,
    },
];

/// Every phone model, in table order.
pub fn all_phones() -> impl Iterator<Item = &'static DevicePreset> + Clone {
    PHONE_GROUPS.iter().flat_map(|g| g.models.iter())
}

/// Look up a phone by label: an exact (case-insensitive) match wins, then
/// the first label containing `query`.
pub fn find_phone(query: &str) -> Option<&'static DevicePreset> {
    find_by_label(all_phones(), query, |d| d.label)
}

/// Look up a desktop preset the same way as [`find_phone`].
pub fn find_desktop(query: &str) -> Option<&'static DesktopPreset> {
    find_by_label(DESKTOP_PRESETS.iter(), query, |d| d.label)
}

/// The first phone with this resolution; the pair is put in portrait
/// orientation first.
pub fn match_resolution(width: u32, height: u32) -> Option<&'static DevicePreset> {
    let (w, h) = (width.min(height), width.max(height));
    all_phones().find(|d| d.width == w && d.height == h)
}

fn find_by_label<T: Copy>(
    items: impl Iterator<Item = T> + Clone,
    query: &str,
    label: impl Fn(T) -> &'static str,
) -> Option<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    items
        .clone()
        .find(|d| label(*d).to_lowercase() == needle)
        .or_else(|| items.into_iter().find(|d| label(*d).to_lowercase().contains(&needle)))
}

impl DevicePreset {
    pub fn to_raw(&self) -> RawOptions {
        RawOptions {
            width: Some(json!(self.width)),
            height: Some(json!(self.height)),
            ..Default::default()
        }
    }
}

impl DesktopPreset {
    pub fn to_raw(&self) -> RawOptions {
        RawOptions {
            width: Some(json!(self.width)),
            height: Some(json!(self.height)),
            cell_size: Some(json!(self.cell_size)),
            gap: Some(json!(self.gap)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::normalize;

    #[test]
    fn phones_are_portrait() {
        assert!(all_phones().all(|d| d.width < d.height));
        assert_eq!(all_phones().count(), 33);
    }

    #[test]
    fn lookup_prefers_exact_label() {
        let d = find_phone("iphone 16 pro").unwrap();
        assert_eq!((d.width, d.height), (1206, 2622));
        let d = find_phone("Pixel 9 Pro Fold").unwrap();
        assert_eq!(d.height, 2424);
        let d = find_phone("nord").unwrap();
        assert_eq!(d.label, "OnePlus Nord 4 / CE 4");
        assert!(find_phone("").is_none());
        assert!(find_phone("nokia").is_none());
    }

    #[test]
    fn resolution_match_ignores_orientation() {
        let d = match_resolution(2556, 1179).unwrap();
        assert_eq!(d.label, "iPhone 16 / 15 / 15 Pro");
        assert!(match_resolution(1000, 1000).is_none());
    }

    #[test]
    fn desktop_preset_sets_cell_and_gap() {
        let p = find_desktop("4k").unwrap();
        let cfg = normalize(&p.to_raw());
        assert_eq!((cfg.width, cfg.height, cfg.cell_size, cfg.gap), (3840, 2160, 16, 2));
    }
}
