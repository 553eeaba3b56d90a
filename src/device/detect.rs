//! user-agent based device classification

use lazy_static::lazy_static;
use regex::Regex;

use super::DeviceClass;

/// classifies the requesting device
pub trait DeviceDetector {
    fn classify(&self, user_agent: &str) -> DeviceClass;
}

lazy_static! {
    static ref TABLET_UA: Regex = Regex::new(
        r"(?i)ipad|tablet|playbook|kindle|silk/|nexus (7|9|10)|sm-t\d|gt-p\d|tab\d|xoom|sch-i800"
    )
    .expect("tablet pattern is valid");
    static ref MOBILE_UA: Regex = Regex::new(
        r"(?i)iphone|ipod|android|blackberry|bb10|windows phone|iemobile|opera mini|opera mobi|mobile|webos|palm|symbian|nokia|fennec|kindle|silk/"
    )
    .expect("mobile pattern is valid");
}

/// pattern-based detector over the request's User-Agent header
///
/// android devices without "mobile" in their agent string are tablets
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentDetector;

impl DeviceDetector for UserAgentDetector {
    fn classify(&self, user_agent: &str) -> DeviceClass {
        let lower = user_agent.to_lowercase();
        let android_tablet = lower.contains("android") && !lower.contains("mobile");

        let is_tablet = android_tablet || TABLET_UA.is_match(user_agent);
        let is_mobile = is_tablet || MOBILE_UA.is_match(user_agent);

        DeviceClass::new(is_mobile, is_tablet)
    }
}
