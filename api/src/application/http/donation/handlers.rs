pub mod analyze_image;
pub mod analyze_text;
pub mod estimate_co2;
