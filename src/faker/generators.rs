//! Named fake value generators available to `@fake(type: ...)`.
//!
//! Text generators are backed by the `fake` crate's locale-aware fakers. The few categories
//! it has no faker for draw from small word lists.

use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use fake::faker::address::raw::{
    BuildingNumber, CityName, CountryCode, CountryName, SecondaryAddress, StateAbbr, StateName,
    StreetName, ZipCode,
};
use fake::faker::company::raw::{Bs, CatchPhrase, CompanyName};
use fake::faker::currency::raw::{CurrencyCode, CurrencyName, CurrencySymbol};
use fake::faker::internet::raw::{
    DomainSuffix, IPv4, IPv6, MACAddress, Password, SafeEmail, UserAgent, Username,
};
use fake::faker::job::raw::Title as JobTitle;
use fake::faker::lorem::raw::{Paragraph, Paragraphs, Sentence, Sentences, Word, Words};
use fake::faker::name::raw::{FirstName, LastName, Name};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{EN, FR_FR, ZH_CN, ZH_TW};
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::domain::{FakerError, JsonMap};

/// Locales understood by `@fake(locale: ...)` and the `faker.locale` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "fr_FR")]
    FrFr,
    #[serde(rename = "zh_CN")]
    ZhCn,
    #[serde(rename = "zh_TW")]
    ZhTw,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::En, Locale::FrFr, Locale::ZhCn, Locale::ZhTw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::FrFr => "fr_FR",
            Locale::ZhCn => "zh_CN",
            Locale::ZhTw => "zh_TW",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = FakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str() == s)
            .ok_or_else(|| FakerError::UnknownLocale(s.to_string()))
    }
}

/// Runs a raw `fake` faker with the locale marker matching `$locale`
macro_rules! localized {
    ($locale:expr, $rng:expr, $out:ty, $faker:ident $(, $arg:expr)*) => {
        match $locale {
            Locale::En => $faker(EN $(, $arg)*).fake_with_rng::<$out, _>(&mut *$rng),
            Locale::FrFr => $faker(FR_FR $(, $arg)*).fake_with_rng::<$out, _>(&mut *$rng),
            Locale::ZhCn => $faker(ZH_CN $(, $arg)*).fake_with_rng::<$out, _>(&mut *$rng),
            Locale::ZhTw => $faker(ZH_TW $(, $arg)*).fake_with_rng::<$out, _>(&mut *$rng),
        }
    };
}

macro_rules! generators {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Every generator name of the `fake__Types` enum
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Generator {
            $($variant),+
        }

        impl Generator {
            pub const ALL: &'static [Generator] = &[$(Generator::$variant),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Generator::$variant => $name),+
                }
            }
        }

        impl FromStr for Generator {
            type Err = FakerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Generator::$variant),)+
                    other => Err(FakerError::UnknownGenerator(other.to_string())),
                }
            }
        }
    };
}

generators! {
    ZipCode => "zipCode",
    City => "city",
    StreetName => "streetName",
    StreetAddress => "streetAddress",
    SecondaryAddress => "secondaryAddress",
    County => "county",
    Country => "country",
    CountryCode => "countryCode",
    State => "state",
    StateAbbr => "stateAbbr",
    Latitude => "latitude",
    Longitude => "longitude",
    ColorName => "colorName",
    ProductCategory => "productCategory",
    ProductName => "productName",
    Money => "money",
    ProductMaterial => "productMaterial",
    Product => "product",
    CompanyName => "companyName",
    CompanyCatchPhrase => "companyCatchPhrase",
    CompanyBs => "companyBS",
    DbColumn => "dbColumn",
    DbType => "dbType",
    DbCollation => "dbCollation",
    DbEngine => "dbEngine",
    Date => "date",
    PastDate => "pastDate",
    FutureDate => "futureDate",
    RecentDate => "recentDate",
    FinanceAccountName => "financeAccountName",
    FinanceTransactionType => "financeTransactionType",
    CurrencyCode => "currencyCode",
    CurrencyName => "currencyName",
    CurrencySymbol => "currencySymbol",
    BitcoinAddress => "bitcoinAddress",
    Iban => "internationalBankAccountNumber",
    Bic => "bankIdentifierCode",
    HackerAbbreviation => "hackerAbbreviation",
    HackerPhrase => "hackerPhrase",
    ImageUrl => "imageUrl",
    AvatarUrl => "avatarUrl",
    Email => "email",
    Url => "url",
    DomainName => "domainName",
    Ipv4Address => "ipv4Address",
    Ipv6Address => "ipv6Address",
    UserAgent => "userAgent",
    ColorHex => "colorHex",
    MacAddress => "macAddress",
    Password => "password",
    Lorem => "lorem",
    FirstName => "firstName",
    LastName => "lastName",
    FullName => "fullName",
    JobTitle => "jobTitle",
    PhoneNumber => "phoneNumber",
    Number => "number",
    Uuid => "uuid",
    Word => "word",
    Words => "words",
    Locale => "locale",
    Filename => "filename",
    MimeType => "mimeType",
    FileExtension => "fileExtension",
    Semver => "semver",
}

const COLORS: &[&str] = &[
    "red", "green", "blue", "yellow", "purple", "mint green", "teal", "white", "black",
    "orange", "pink", "grey", "maroon", "violet", "turquoise", "tan", "sky blue", "salmon",
    "plum", "orchid", "olive", "magenta", "lime", "ivory", "indigo", "gold", "fuchsia",
    "cyan", "azure", "lavender", "silver",
];
const PRODUCT_CATEGORIES: &[&str] = &[
    "Books", "Movies", "Music", "Games", "Electronics", "Computers", "Home", "Garden", "Tools",
    "Grocery", "Health", "Beauty", "Toys", "Kids", "Baby", "Clothing", "Shoes", "Jewelery",
    "Sports", "Outdoors", "Automotive", "Industrial",
];
const PRODUCT_ADJECTIVES: &[&str] = &[
    "Small", "Ergonomic", "Rustic", "Intelligent", "Gorgeous", "Incredible", "Fantastic",
    "Practical", "Sleek", "Awesome", "Generic", "Handcrafted", "Handmade", "Licensed",
    "Refined", "Unbranded", "Tasty",
];
const PRODUCT_MATERIALS: &[&str] = &[
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Metal", "Soft",
    "Fresh", "Frozen",
];
const PRODUCTS: &[&str] = &[
    "Chair", "Car", "Computer", "Keyboard", "Mouse", "Bike", "Ball", "Gloves", "Pants",
    "Shirt", "Table", "Shoes", "Hat", "Towels", "Soap", "Tuna", "Chicken", "Fish", "Cheese",
    "Bacon", "Pizza", "Salad", "Sausages", "Chips",
];
const DB_COLUMNS: &[&str] = &[
    "id", "title", "name", "email", "phone", "token", "group", "category", "password",
    "comment", "avatar", "status", "createdAt", "updatedAt",
];
const DB_TYPES: &[&str] = &[
    "int", "varchar", "text", "date", "datetime", "tinyint", "time", "timestamp", "smallint",
    "mediumint", "bigint", "decimal", "float", "double", "real", "bit", "boolean", "serial",
    "blob", "binary", "enum", "set", "geometry", "point",
];
const DB_COLLATIONS: &[&str] = &[
    "utf8_unicode_ci", "utf8_general_ci", "utf8_bin", "ascii_bin", "ascii_general_ci",
    "cp1250_bin", "cp1250_general_ci",
];
const DB_ENGINES: &[&str] = &["InnoDB", "MyISAM", "MEMORY", "CSV", "BLACKHOLE", "ARCHIVE"];
const ACCOUNT_TYPES: &[&str] = &[
    "Checking", "Savings", "Money Market", "Investment", "Home Loan", "Credit Card",
    "Auto Loan", "Personal Loan",
];
const TRANSACTION_TYPES: &[&str] = &["deposit", "withdrawal", "payment", "invoice"];
const HACKER_ABBREVIATIONS: &[&str] = &[
    "ADP", "AGP", "AI", "API", "ASCII", "CLI", "COM", "CSS", "DNS", "EXE", "FTP", "GB", "HDD",
    "HEX", "HTTP", "IB", "IP", "JBOD", "JSON", "OCR", "PCI", "PNG", "RAM", "RSS", "SAS",
    "SCSI", "SDD", "SMS", "SMTP", "SQL", "SSD", "SSL", "TCP", "THX", "TLS", "UDP", "USB",
    "UTF8", "XML", "XSS",
];
const HACKER_ADJECTIVES: &[&str] = &[
    "auxiliary", "primary", "back-end", "digital", "open-source", "virtual", "cross-platform",
    "redundant", "online", "haptic", "multi-byte", "bluetooth", "wireless", "1080p",
    "neural", "optical", "solid state", "mobile",
];
const HACKER_NOUNS: &[&str] = &[
    "driver", "protocol", "bandwidth", "panel", "microchip", "program", "port", "card",
    "array", "interface", "system", "sensor", "firewall", "hard drive", "pixel", "alarm",
    "feed", "monitor", "application", "transmitter", "bus", "circuit", "capacitor", "matrix",
];
const HACKER_VERBS: &[&str] = &[
    "back up", "bypass", "hack", "override", "compress", "copy", "navigate", "index",
    "connect", "generate", "quantify", "calculate", "synthesize", "input", "transmit",
    "program", "reboot", "parse",
];
const FILE_EXTENSIONS: &[(&str, &str)] = &[
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("csv", "text/csv"),
    ("xml", "application/xml"),
];
const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DEFAULT_DATE_FROM: &str = "2010-01-01";
const DEFAULT_DATE_TO: &str = "2030-01-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoremSize {
    Word,
    Words,
    Sentence,
    Sentences,
    Paragraph,
    Paragraphs,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseColor {
    pub red255: u8,
    pub green255: u8,
    pub blue255: u8,
}

/// The `fake__options` input object. Options irrelevant to a generator are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FakeOptions {
    pub use_full_address: Option<bool>,
    pub min_money: Option<f64>,
    pub max_money: Option<f64>,
    pub decimal_places: Option<u32>,
    pub image_size: Option<ImageSize>,
    pub image_keywords: Option<Vec<String>>,
    pub randomize_image_url: Option<bool>,
    pub email_provider: Option<String>,
    pub password_length: Option<usize>,
    pub lorem_size: Option<LoremSize>,
    pub date_format: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub base_color: Option<BaseColor>,
    pub min_number: Option<f64>,
    pub max_number: Option<f64>,
    pub precision_number: Option<f64>,
}

impl FakeOptions {
    pub fn from_map(options: &JsonMap) -> Result<Self, FakerError> {
        serde_json::from_value(Value::Object(options.clone())).map_err(|e| {
            FakerError::InvalidDirective {
                directive: "fake".to_string(),
                reason: format!("invalid options: {e}"),
            }
        })
    }
}

fn pick<R: Rng>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn text(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

impl Generator {
    /// Produces one value. Most generators yield strings, `number` yields a JSON number.
    pub fn generate<R: Rng>(
        &self,
        options: &FakeOptions,
        locale: Locale,
        rng: &mut R,
    ) -> Result<Value, FakerError> {
        let value = match self {
            Generator::ZipCode => text(localized!(locale, rng, String, ZipCode)),
            Generator::City => text(localized!(locale, rng, String, CityName)),
            Generator::StreetName => text(localized!(locale, rng, String, StreetName)),
            Generator::StreetAddress => {
                let number = localized!(locale, rng, String, BuildingNumber);
                let street = localized!(locale, rng, String, StreetName);
                let mut address = format!("{number} {street}");
                if options.use_full_address.unwrap_or(false) {
                    let secondary = localized!(locale, rng, String, SecondaryAddress);
                    address = format!("{address} {secondary}");
                }
                text(address)
            }
            Generator::SecondaryAddress => text(localized!(locale, rng, String, SecondaryAddress)),
            Generator::County => text(format!("{} County", localized!(locale, rng, String, CityName))),
            Generator::Country => text(localized!(locale, rng, String, CountryName)),
            Generator::CountryCode => text(localized!(locale, rng, String, CountryCode)),
            Generator::State => text(localized!(locale, rng, String, StateName)),
            Generator::StateAbbr => text(localized!(locale, rng, String, StateAbbr)),
            Generator::Latitude => text(format!("{:.4}", rng.gen_range(-90.0..=90.0))),
            Generator::Longitude => text(format!("{:.4}", rng.gen_range(-180.0..=180.0))),
            Generator::ColorName => text(pick(rng, COLORS)),
            Generator::ProductCategory => text(pick(rng, PRODUCT_CATEGORIES)),
            Generator::ProductName => text(format!(
                "{} {} {}",
                pick(rng, PRODUCT_ADJECTIVES),
                pick(rng, PRODUCT_MATERIALS),
                pick(rng, PRODUCTS)
            )),
            Generator::Money => money(options, rng),
            Generator::ProductMaterial => text(pick(rng, PRODUCT_MATERIALS)),
            Generator::Product => text(pick(rng, PRODUCTS)),
            Generator::CompanyName => text(localized!(locale, rng, String, CompanyName)),
            Generator::CompanyCatchPhrase => text(localized!(locale, rng, String, CatchPhrase)),
            Generator::CompanyBs => text(localized!(locale, rng, String, Bs)),
            Generator::DbColumn => text(pick(rng, DB_COLUMNS)),
            Generator::DbType => text(pick(rng, DB_TYPES)),
            Generator::DbCollation => text(pick(rng, DB_COLLATIONS)),
            Generator::DbEngine => text(pick(rng, DB_ENGINES)),
            Generator::Date => {
                let from = parse_day(options.date_from.as_deref().unwrap_or(DEFAULT_DATE_FROM))?;
                let to = parse_day(options.date_to.as_deref().unwrap_or(DEFAULT_DATE_TO))?;
                let (from, to) = if from <= to { (from, to) } else { (to, from) };
                let seconds = (to - from).num_seconds();
                let offset = if seconds > 0 { rng.gen_range(0..=seconds) } else { 0 };
                format_date(from + Duration::seconds(offset), options)?
            }
            Generator::PastDate => {
                let offset = rng.gen_range(1..=365 * 86_400);
                format_date(Utc::now() - Duration::seconds(offset), options)?
            }
            Generator::FutureDate => {
                let offset = rng.gen_range(1..=365 * 86_400);
                format_date(Utc::now() + Duration::seconds(offset), options)?
            }
            Generator::RecentDate => {
                let offset = rng.gen_range(0..=86_400);
                format_date(Utc::now() - Duration::seconds(offset), options)?
            }
            Generator::FinanceAccountName => text(format!("{} Account", pick(rng, ACCOUNT_TYPES))),
            Generator::FinanceTransactionType => text(pick(rng, TRANSACTION_TYPES)),
            Generator::CurrencyCode => text(localized!(locale, rng, String, CurrencyCode)),
            Generator::CurrencyName => text(localized!(locale, rng, String, CurrencyName)),
            Generator::CurrencySymbol => text(localized!(locale, rng, String, CurrencySymbol)),
            Generator::BitcoinAddress => {
                let prefix = if rng.gen_bool(0.5) { '1' } else { '3' };
                let len = rng.gen_range(25..=33);
                let body: String = (0..len)
                    .map(|_| BASE58[rng.gen_range(0..BASE58.len())] as char)
                    .collect();
                text(format!("{prefix}{body}"))
            }
            Generator::Iban => {
                let country = localized!(locale, rng, String, CountryCode);
                let check: u8 = rng.gen_range(10..=99);
                let bank = upper_letters(rng, 4);
                text(format!("{country}{check}{bank}{}", digits(rng, 14)))
            }
            Generator::Bic => {
                let country = localized!(locale, rng, String, CountryCode);
                let mut bic = format!("{}{country}{}", upper_letters(rng, 4), upper_letters(rng, 2));
                if rng.gen_bool(0.5) {
                    bic.push_str(&digits(rng, 3));
                }
                text(bic)
            }
            Generator::HackerAbbreviation => text(pick(rng, HACKER_ABBREVIATIONS)),
            Generator::HackerPhrase => text(format!(
                "If we {} the {}, we can get to the {} {} through the {} {} {}!",
                pick(rng, HACKER_VERBS),
                pick(rng, HACKER_NOUNS),
                pick(rng, HACKER_ABBREVIATIONS),
                pick(rng, HACKER_NOUNS),
                pick(rng, HACKER_ADJECTIVES),
                pick(rng, HACKER_ABBREVIATIONS),
                pick(rng, HACKER_NOUNS),
            )),
            Generator::ImageUrl => {
                let size = options.image_size.unwrap_or(ImageSize {
                    width: 640,
                    height: 480,
                });
                let mut url = format!("https://loremflickr.com/{}/{}", size.width, size.height);
                if let Some(keywords) = options.image_keywords.as_ref().filter(|k| !k.is_empty()) {
                    url = format!("{url}/{}", keywords.join(","));
                }
                if options.randomize_image_url.unwrap_or(false) {
                    url = format!("{url}?lock={}", rng.gen_range(0..100_000));
                }
                text(url)
            }
            Generator::AvatarUrl => text(format!("https://i.pravatar.cc/300?img={}", rng.gen_range(1..=70))),
            Generator::Email => match &options.email_provider {
                Some(provider) => {
                    let user = localized!(locale, rng, String, Username);
                    text(format!("{user}@{provider}"))
                }
                None => text(localized!(locale, rng, String, SafeEmail)),
            },
            Generator::Url => text(format!("https://{}", domain_name(locale, rng))),
            Generator::DomainName => text(domain_name(locale, rng)),
            Generator::Ipv4Address => text(localized!(locale, rng, String, IPv4)),
            Generator::Ipv6Address => text(localized!(locale, rng, String, IPv6)),
            Generator::UserAgent => text(localized!(locale, rng, String, UserAgent)),
            Generator::ColorHex => {
                let base = options.base_color.unwrap_or_default();
                // mixing with the base color keeps the hue close to it
                let mut channel = |base: u8| (rng.gen_range(0..=255u16) + u16::from(base)) / 2;
                let (r, g, b) = (
                    channel(base.red255),
                    channel(base.green255),
                    channel(base.blue255),
                );
                text(format!("#{r:02x}{g:02x}{b:02x}"))
            }
            Generator::MacAddress => text(localized!(locale, rng, String, MACAddress)),
            Generator::Password => {
                let len = options.password_length.unwrap_or(15).max(1);
                text(localized!(locale, rng, String, Password, len..len + 1))
            }
            Generator::Lorem => match options.lorem_size.unwrap_or(LoremSize::Paragraphs) {
                LoremSize::Word => text(localized!(locale, rng, String, Word)),
                LoremSize::Words => text(localized!(locale, rng, Vec<String>, Words, 3..4).join(" ")),
                LoremSize::Sentence => text(localized!(locale, rng, String, Sentence, 3..10)),
                LoremSize::Sentences => {
                    text(localized!(locale, rng, Vec<String>, Sentences, 2..6).join(" "))
                }
                LoremSize::Paragraph => text(localized!(locale, rng, String, Paragraph, 3..6)),
                LoremSize::Paragraphs => {
                    text(localized!(locale, rng, Vec<String>, Paragraphs, 3..4).join("\n \r"))
                }
            },
            Generator::FirstName => text(localized!(locale, rng, String, FirstName)),
            Generator::LastName => text(localized!(locale, rng, String, LastName)),
            Generator::FullName => text(localized!(locale, rng, String, Name)),
            Generator::JobTitle => text(localized!(locale, rng, String, JobTitle)),
            Generator::PhoneNumber => text(localized!(locale, rng, String, PhoneNumber)),
            Generator::Number => number(options, rng),
            Generator::Uuid => text(uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()),
            Generator::Word => text(localized!(locale, rng, String, Word)),
            Generator::Words => text(localized!(locale, rng, Vec<String>, Words, 3..4).join(" ")),
            Generator::Locale => text(Locale::ALL[rng.gen_range(0..Locale::ALL.len())].as_str()),
            Generator::Filename => {
                let word = localized!(Locale::En, rng, String, Word);
                let (ext, _) = FILE_EXTENSIONS[rng.gen_range(0..FILE_EXTENSIONS.len())];
                text(format!("{word}.{ext}"))
            }
            Generator::MimeType => text(FILE_EXTENSIONS[rng.gen_range(0..FILE_EXTENSIONS.len())].1),
            Generator::FileExtension => text(FILE_EXTENSIONS[rng.gen_range(0..FILE_EXTENSIONS.len())].0),
            Generator::Semver => text(format!(
                "{}.{}.{}",
                rng.gen_range(0..10),
                rng.gen_range(0..10),
                rng.gen_range(0..10)
            )),
        };
        Ok(value)
    }
}

fn money<R: Rng>(options: &FakeOptions, rng: &mut R) -> Value {
    let min = options.min_money.unwrap_or(0.0);
    let max = options.max_money.unwrap_or(1000.0).max(min);
    let places = options.decimal_places.unwrap_or(2) as usize;
    let amount = if max > min { rng.gen_range(min..=max) } else { min };
    text(format!("{amount:.places$}"))
}

fn number<R: Rng>(options: &FakeOptions, rng: &mut R) -> Value {
    let min = options.min_number.unwrap_or(0.0);
    let max = options.max_number.unwrap_or(99_999.0).max(min);
    let precision = options
        .precision_number
        .filter(|p| *p > 0.0)
        .unwrap_or(1.0);

    let low = (min / precision).ceil() as i64;
    let high = ((max / precision).floor() as i64).max(low);
    let steps = rng.gen_range(low..=high);
    if precision.fract() == 0.0 {
        return Value::Number((steps * precision as i64).into());
    }
    let scale = 10f64.powi(decimals(precision));
    Number::from_f64((steps as f64 * precision * scale).round() / scale)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Decimal digits needed to print a precision step such as `0.01`
fn decimals(precision: f64) -> i32 {
    let mut digits = 0;
    let mut step = precision;
    while step.fract().abs() > 1e-9 && digits < 10 {
        step *= 10.0;
        digits += 1;
    }
    digits
}

fn parse_day(day: &str) -> Result<DateTime<Utc>, FakerError> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
        FakerError::InvalidDirective {
            directive: "fake".to_string(),
            reason: format!("invalid date {day:?}: {e}"),
        }
    })?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
}

fn format_date(date: DateTime<Utc>, options: &FakeOptions) -> Result<Value, FakerError> {
    let pattern = options.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(FakerError::InvalidDirective {
            directive: "fake".to_string(),
            reason: format!("invalid dateFormat {pattern:?}"),
        });
    }
    Ok(text(date.format(pattern).to_string()))
}

fn domain_name<R: Rng>(locale: Locale, rng: &mut R) -> String {
    let word = localized!(Locale::En, rng, String, Word).to_lowercase();
    let suffix = localized!(locale, rng, String, DomainSuffix);
    format!("{word}.{suffix}")
}

fn upper_letters<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect()
}

fn digits<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}
