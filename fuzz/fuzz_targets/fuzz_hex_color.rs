#![no_main]

use branding::domain::color::{Hsl, INVALID_HSL, Rgb, hex_to_hsl};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        match Rgb::parse_hex(s) {
            Ok(rgb) => {
                let hsl = Hsl::from(rgb);
                assert!(hsl.hue < 360);
                assert!(hsl.saturation <= 100);
                assert!(hsl.lightness <= 100);
                assert_eq!(hex_to_hsl(s), hsl.to_string());
            }
            Err(_) => assert_eq!(hex_to_hsl(s), INVALID_HSL),
        }
    }
});
