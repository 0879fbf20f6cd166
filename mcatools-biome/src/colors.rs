//! Biome id <-> RGB colour table.

/// Colour for ids missing from [`COLORS`].
pub const UNKNOWN_COLOR: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Known biome ids and their map colours, sorted by id.
pub const COLORS: &[(i32, [u8; 3])] = &[
    (0, [0x00, 0x00, 0x70]),
    (1, [0x8d, 0xb3, 0x60]),
    (2, [0xfa, 0x94, 0x18]),
    (3, [0x60, 0x60, 0x60]),
    (4, [0x05, 0x66, 0x21]),
    (5, [0x0b, 0x66, 0x59]),
    (6, [0x07, 0xf9, 0xb2]),
    (7, [0x00, 0x00, 0xff]),
    (8, [0xff, 0x00, 0x00]),
    (9, [0x80, 0x80, 0xff]),
    (10, [0x90, 0x90, 0xa0]),
    (11, [0xa0, 0xa0, 0xff]),
    (12, [0xff, 0xff, 0xff]),
    (13, [0xa0, 0xa0, 0xa0]),
    (14, [0xff, 0x00, 0xff]),
    (15, [0xa0, 0x00, 0xff]),
    (16, [0xfa, 0xde, 0x55]),
    (17, [0xd2, 0x5f, 0x12]),
    (18, [0x22, 0x55, 0x1c]),
    (19, [0x16, 0x39, 0x33]),
    (20, [0x72, 0x78, 0x9a]),
    (21, [0x53, 0x7b, 0x09]),
    (22, [0x2c, 0x42, 0x05]),
    (23, [0x62, 0x8b, 0x17]),
    (24, [0x00, 0x00, 0x30]),
    (25, [0xa2, 0xa2, 0x84]),
    (26, [0xfa, 0xf0, 0xc0]),
    (27, [0x30, 0x74, 0x44]),
    (28, [0x1f, 0x5f, 0x32]),
    (29, [0x40, 0x51, 0x1a]),
    (30, [0x31, 0x55, 0x4a]),
    (31, [0x24, 0x3f, 0x36]),
    (32, [0x59, 0x66, 0x51]),
    (33, [0x45, 0x4f, 0x3e]),
    (34, [0x50, 0x70, 0x50]),
    (35, [0xbd, 0xb2, 0x5f]),
    (36, [0xa7, 0x9d, 0x64]),
    (37, [0xd9, 0x45, 0x15]),
    (38, [0xb0, 0x97, 0x65]),
    (39, [0xca, 0x8c, 0x65]),
    (40, [0x80, 0x80, 0xff]),
    (41, [0x80, 0x80, 0xff]),
    (42, [0x80, 0x80, 0xff]),
    (43, [0x80, 0x80, 0xff]),
    (44, [0x00, 0x00, 0xac]),
    (45, [0x00, 0x00, 0x90]),
    (46, [0x20, 0x20, 0x70]),
    (47, [0x00, 0x00, 0x50]),
    (48, [0x00, 0x00, 0x40]),
    (49, [0x20, 0x20, 0x38]),
    (50, [0x40, 0x40, 0x90]),
    (127, [0x28, 0x28, 0x98]),
    (129, [0xb5, 0xdb, 0x88]),
    (130, [0xff, 0xbc, 0x40]),
    (131, [0x88, 0x88, 0x88]),
    (132, [0x2d, 0x8e, 0x49]),
    (133, [0x33, 0x8e, 0x81]),
    (134, [0x2f, 0xff, 0xda]),
    (140, [0xb4, 0xdc, 0xdc]),
    (149, [0x7b, 0xa3, 0x31]),
    (151, [0x8a, 0xb3, 0x3f]),
    (155, [0x58, 0x9c, 0x6c]),
    (156, [0x47, 0x87, 0x5a]),
    (157, [0x68, 0x79, 0x42]),
    (158, [0x59, 0x7d, 0x72]),
    (160, [0x81, 0x8e, 0x79]),
    (161, [0x6d, 0x77, 0x66]),
    (162, [0x78, 0x98, 0x78]),
    (163, [0xe5, 0xda, 0x87]),
    (164, [0xcf, 0xc5, 0x8c]),
    (165, [0xff, 0x6d, 0x3d]),
    (166, [0xd8, 0xbf, 0x8d]),
    (167, [0xf2, 0xb4, 0x8d]),
];

pub fn to_rgb(id: i32) -> [u8; 3] {
    COLORS
        .binary_search_by_key(&id, |&(known, _)| known)
        .map(|i| COLORS[i].1)
        .unwrap_or(UNKNOWN_COLOR)
}

fn distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Biome id for a colour. Exact matches win, lowest id first on shared
/// colours; anything else maps to the nearest table colour.
pub fn from_rgb(rgb: [u8; 3]) -> i32 {
    COLORS
        .iter()
        .min_by_key(|&&(id, color)| (distance(color, rgb), id))
        .map(|&(id, _)| id)
        .unwrap_or(0)
}
