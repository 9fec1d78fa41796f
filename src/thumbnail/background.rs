//! Base image for a thumbnail: a fitted stock photo, or a gradient when no
//! photo can be had.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use super::color::{parse_hex, vertical_gradient};
use super::filters::{enhance_contrast, enhance_sharpness};
use crate::category::Category;

/// Contrast boost applied to fetched photos.
pub const PHOTO_CONTRAST: f32 = 1.3;
/// Sharpness boost applied to fetched photos.
pub const PHOTO_SHARPNESS: f32 = 1.2;

/// Gradient pairs used when no photo is available.
pub const GRADIENT_PAIRS: [(&str, &str); 5] = [
    ("#FF6B6B", "#4ECDC4"),
    ("#667eea", "#764ba2"),
    ("#f093fb", "#f5576c"),
    ("#4facfe", "#00f2fe"),
    ("#43e97b", "#38f9d7"),
];

const MATCHED_SUFFIX: &str = ",vibrant,high contrast";
const FALLBACK_SUFFIX: &str = ",high contrast";
const GENERIC_PHRASE: &str = "creative,vibrant,colorful";

/// A stock-photo lookup. Any failure is reported as `None`.
pub trait PhotoSource: Send + Sync {
    /// One representative photo for `query`, if the lookup succeeds.
    fn fetch_background(&self, query: &str) -> Option<DynamicImage>;
}

/// A lookup that never finds anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPhotos;

impl PhotoSource for NoPhotos {
    fn fetch_background(&self, _query: &str) -> Option<DynamicImage> {
        None
    }
}

/// Maps a keyword found in the video text to a photo search query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QueryRule {
    /// Lower-case substring to look for.
    pub keyword: &'static str,
    /// Search terms used when it matches.
    pub query: &'static str,
}

const fn rule(keyword: &'static str, query: &'static str) -> QueryRule {
    QueryRule { keyword, query }
}

const LOCATION_RULES: &[QueryRule] = &[
    rule("panama", "panama city,panama landscape,central america"),
    rule("istanbul", "istanbul,turkey,bosphorus"),
    rule("paris", "paris,eiffel tower,france"),
    rule("tokyo", "tokyo,japan,cityscape"),
    rule("new york", "new york,manhattan,usa"),
    rule("londra", "london,big ben,england"),
    rule("dubai", "dubai,burj khalifa,uae"),
    rule("bali", "bali,indonesia,tropical"),
    rule("roma", "rome,colosseum,italy"),
    rule("barselona", "barcelona,sagrada familia,spain"),
    rule("amsterdam", "amsterdam,netherlands,canals"),
    rule("prag", "prague,czech republic,castle"),
];

const EDUCATION_RULES: &[QueryRule] = &[
    rule("matematik", "mathematics,colorful equations,numbers,geometry"),
    rule("integral", "calculus,mathematics,colorful formulas"),
    rule("fizik", "physics,science,colorful laboratory"),
    rule("kimya", "chemistry,colorful laboratory,molecules"),
    rule("biyoloji", "biology,nature,colorful microscope"),
    rule("tarih", "history,ancient,colorful books"),
    rule("coğrafya", "geography,colorful maps,globe"),
    rule("edebiyat", "literature,colorful books,reading"),
    rule("yks", "study,exam preparation,colorful books"),
    rule("geometri", "geometry,colorful shapes,mathematics"),
];

const SPORT_RULES: &[QueryRule] = &[
    rule("futbol", "football,soccer,colorful stadium,action"),
    rule("basketbol", "basketball,colorful court,action"),
    rule("voleybol", "volleyball,colorful net,action"),
    rule("fitness", "gym,workout,colorful dumbbells,dynamic"),
    rule("koşu", "running,marathon,colorful track,action"),
    rule("yüzme", "swimming,colorful pool,water,action"),
    rule("yoga", "yoga,meditation,colorful mat,peaceful"),
    rule("bacak", "leg workout,gym,colorful fitness,muscles"),
    rule("kol", "arm workout,colorful dumbbells,biceps,gym"),
];

const FOOD_RULES: &[QueryRule] = &[
    rule("pasta", "pasta,colorful italian food,delicious"),
    rule("pizza", "pizza,colorful cheese,restaurant"),
    rule("tatlı", "dessert,colorful sweet,cake"),
    rule("pilav", "rice,colorful turkish food,plate"),
    rule("çorba", "soup,hot meal,colorful bowl"),
    rule("salata", "salad,healthy,colorful vegetables"),
    rule("et", "meat,steak,colorful grill"),
    rule("balık", "fish,seafood,colorful ocean"),
    rule("hamburger", "burger,colorful fast food,delicious"),
    rule("makarna", "pasta,colorful noodles,italian"),
];

const GAME_RULES: &[QueryRule] = &[
    rule("lol", "league of legends,gaming,colorful esports"),
    rule("valorant", "valorant,fps,colorful gaming"),
    rule("minecraft", "minecraft,blocks,colorful gaming"),
    rule("fortnite", "fortnite,battle royale,colorful gaming"),
    rule("cs", "counter strike,fps,colorful gaming"),
    rule("fifa", "fifa,football game,colorful soccer"),
    rule("gta", "gta,open world,colorful gaming"),
];

fn topic_rules(category: Category) -> &'static [QueryRule] {
    match category {
        Category::Egitim => EDUCATION_RULES,
        Category::Spor => SPORT_RULES,
        Category::Yemek => FOOD_RULES,
        Category::Oyun => GAME_RULES,
        _ => &[],
    }
}

fn category_phrase(category: Category) -> &'static str {
    match category {
        Category::Vlog => "lifestyle,people,daily life,vibrant",
        Category::Yemek => "food,cooking,delicious meal,colorful",
        Category::Podcast => "microphone,podcast studio,recording,professional",
        Category::Travel => "travel,adventure,beautiful landscape,scenic",
        Category::Spor => "fitness,gym,sports training,dynamic",
        Category::Oyun => "gaming,esports,neon lights,colorful",
        Category::Egitim => "education,learning,study,bright",
        Category::Teknoloji => "technology,computer,modern tech,colorful",
        Category::Diger => GENERIC_PHRASE,
    }
}

/// Rules consulted for `category`, in priority order: locations first, then
/// the category's own topics.
pub fn query_rules(category: Option<Category>) -> Vec<QueryRule> {
    let topics = category.map(topic_rules).unwrap_or_default();
    LOCATION_RULES.iter().chain(topics).copied().collect()
}

/// Builds the stock-photo search query for a video.
pub fn background_query(category: &str, title: &str, description: &str) -> String {
    let category = category.parse::<Category>().ok();
    let text = format!("{title} {description}").to_lowercase();
    match query_rules(category)
        .into_iter()
        .find(|rule| text.contains(rule.keyword))
    {
        Some(rule) => {
            debug!("Background keyword matched: {}", rule.keyword);
            format!("{}{MATCHED_SUFFIX}", rule.query)
        }
        None => {
            let phrase = category.map(category_phrase).unwrap_or(GENERIC_PHRASE);
            format!("{phrase}{FALLBACK_SUFFIX}")
        }
    }
}

/// Scales `photo` to cover `width` x `height` and crops the centre.
pub fn fit_cover(photo: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let (photo_width, photo_height) = photo.dimensions();
    let aspect = f64::from(photo_width.max(1)) / f64::from(photo_height.max(1));
    let target_aspect = f64::from(width) / f64::from(height);
    let (scaled_width, scaled_height) = if aspect > target_aspect {
        (((f64::from(height) * aspect) as u32).max(width), height)
    } else {
        (width, ((f64::from(width) / aspect) as u32).max(height))
    };

    let resized = photo
        .resize_exact(scaled_width, scaled_height, FilterType::Lanczos3)
        .to_rgb8();
    let left = (scaled_width - width) / 2;
    let top = (scaled_height - height) / 2;
    imageops::crop_imm(&resized, left, top, width, height).to_image()
}

/// A random gradient from [`GRADIENT_PAIRS`].
pub fn gradient_background<R: rand::Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> RgbImage {
    let (start, end) = GRADIENT_PAIRS
        .choose(rng)
        .copied()
        .unwrap_or(GRADIENT_PAIRS[0]);
    let start = parse_hex(start).unwrap_or(Rgb([0, 0, 0]));
    let end = parse_hex(end).unwrap_or(Rgb([0, 0, 0]));
    vertical_gradient(width, height, start, end)
}

/// Produces the base canvas. Never fails: when the photo lookup comes back
/// empty the canvas is a gradient instead.
pub fn resolve_background<R: rand::Rng + ?Sized>(
    photos: &dyn PhotoSource,
    rng: &mut R,
    category: &str,
    title: &str,
    description: &str,
    width: u32,
    height: u32,
) -> RgbImage {
    let query = background_query(category, title, description);
    match photos.fetch_background(&query) {
        Some(photo) => {
            info!("Background photo found for {query:?}");
            let fitted = fit_cover(&photo, width, height);
            let fitted = enhance_contrast(fitted, PHOTO_CONTRAST);
            enhance_sharpness(fitted, PHOTO_SHARPNESS)
        }
        None => {
            info!("No background photo for {query:?}, using a gradient");
            gradient_background(rng, width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct SolidPhoto(u32, u32);

    impl PhotoSource for SolidPhoto {
        fn fetch_background(&self, _query: &str) -> Option<DynamicImage> {
            Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                self.0,
                self.1,
                Rgb([120, 120, 120]),
            )))
        }
    }

    #[test]
    fn locations_win_over_category_topics() {
        let query = background_query("Yemek", "Istanbul'da pizza turu", "");
        assert_eq!(query, "istanbul,turkey,bosphorus,vibrant,high contrast");
    }

    #[test]
    fn first_matching_topic_in_table_order_wins() {
        let query = background_query("Eğitim", "Tarih ve matematik", "");
        assert_eq!(
            query,
            "mathematics,colorful equations,numbers,geometry,vibrant,high contrast"
        );
    }

    #[test]
    fn description_is_searched_too() {
        let query = background_query("Spor", "Yeni rutinim", "Her sabah YOGA yapıyorum");
        assert_eq!(query, "yoga,meditation,colorful mat,peaceful,vibrant,high contrast");
    }

    #[test]
    fn topics_only_apply_to_their_category() {
        let query = background_query("Teknoloji", "Minecraft sunucusu kurulumu", "");
        assert_eq!(query, "technology,computer,modern tech,colorful,high contrast");
    }

    #[test]
    fn unknown_category_uses_generic_phrase() {
        let query = background_query("Cooking", "nothing to see", "");
        assert_eq!(query, "creative,vibrant,colorful,high contrast");
    }

    #[test]
    fn rule_table_lists_locations_first() {
        let rules = query_rules(Some(Category::Oyun));
        assert_eq!(rules.first().map(|rule| rule.keyword), Some("panama"));
        assert_eq!(rules.last().map(|rule| rule.keyword), Some("gta"));
        assert_eq!(query_rules(None).len(), LOCATION_RULES.len());
    }

    #[test]
    fn fit_cover_fills_exactly() {
        for (w, h) in [(400, 100), (100, 400), (1280, 720), (13, 7)] {
            let photo = DynamicImage::ImageRgb8(RgbImage::new(w, h));
            let fitted = fit_cover(&photo, 1280, 720);
            assert_eq!(fitted.dimensions(), (1280, 720), "{w}x{h}");
        }
    }

    #[test]
    fn seeded_gradients_repeat() {
        let first = gradient_background(&mut StdRng::seed_from_u64(7), 32, 18);
        let second = gradient_background(&mut StdRng::seed_from_u64(7), 32, 18);
        assert_eq!(first, second);
        let top = *first.get_pixel(0, 0);
        assert!(
            GRADIENT_PAIRS
                .iter()
                .any(|(start, _)| parse_hex(start) == Some(top))
        );
    }

    #[test]
    fn missing_photo_falls_back_to_gradient() {
        let mut rng = StdRng::seed_from_u64(1);
        let canvas = resolve_background(&NoPhotos, &mut rng, "Teknoloji", "x", "y", 1280, 720);
        assert_eq!(canvas.dimensions(), (1280, 720));
    }

    #[test]
    fn fetched_photo_is_fitted() {
        let mut rng = StdRng::seed_from_u64(1);
        let canvas =
            resolve_background(&SolidPhoto(300, 300), &mut rng, "Vlog", "", "", 1280, 720);
        assert_eq!(canvas.dimensions(), (1280, 720));
        // A flat grey photo has no contrast or edges to boost.
        assert_eq!(*canvas.get_pixel(640, 360), Rgb([120, 120, 120]));
    }
}
