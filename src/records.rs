use serde::{Deserialize, Serialize};

// Pass-through records mirroring the portal's JSON. The daemon copies
// these verbatim into and out of the snapshot slot; field values are never
// interpreted here. Numeric-looking fields stay strings because that is
// how the portal serves them.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub scored: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPerformance {
    pub test: String,
    pub marks: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub course_code: String,
    pub course_name: String,
    #[serde(default)]
    pub course_type: String,
    pub overall: Score,
    #[serde(default)]
    pub test_performance: Vec<TestPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub credit: String,
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub course_category: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub slot_type: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCourse {
    pub course_code: String,
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub attendance_percentage: String,
    #[serde(default)]
    pub hours_absent: String,
    #[serde(default)]
    pub hours_conducted: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub faculty_name: String,
    #[serde(default)]
    pub slot: String,
}

/// The data triple a Wrapped retrospective is rendered from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedData {
    #[serde(default)]
    pub marks: Vec<Mark>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub attendance: Vec<AttendanceCourse>,
}
