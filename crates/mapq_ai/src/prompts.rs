use mapq_core::vocab::{ALLOWED_MAPTYPES, ALLOWED_THEMES};

/// System prompt for step one: turn a conversational map request into a single precise command.
pub fn query_refinement_prompt() -> String {
    r#"You are an assistant for geographic information systems and police data analysis.
Rewrite the user's vague, conversational map request as one precise, formal command for a
downstream analysis system. Reply with that single sentence only.

Examples:

Fuzzy requests:
- "绘制桥东派出所辖区内的药店分布"
- "我想了解桥东派出所辖区内所有药店的点位分布，在地图上显示绘制出来"
Precise expression:
制作一张惠州市桥东派出所辖区内药店的散点图

Fuzzy requests:
- "绘制惠东县涉毒警情的聚合点统计图"
- "在图上展示惠东县的涉毒警情分布情况，用点聚合的方式显示警情数量"
Precise expression:
制作一张惠州市惠东县涉毒品违法行为类警情的聚合点统计分布图

Fuzzy requests:
- "制作有关河南岸街道涉毒人员的空间热点分布图"
- "在地图上展示河南岸街道涉毒人员的热点分布"
Precise expression:
制作一张惠州市河南岸街道涉毒人员的热力分布图

Rewrite the following request as a precise expression.
"#
    .to_string()
}

/// System prompt for step two: extract intent and entities as a single JSON object.
///
/// The allowed theme and map type values are listed from the same vocabulary the validator
/// enforces.
pub fn intent_recognition_prompt() -> String {
    let themes = ALLOWED_THEMES.join("、");
    let maptypes = ALLOWED_MAPTYPES.join("、");
    format!(
        r#"You are the query front-end of a police knowledge-graph and map application.
Convert the user's request into one structured JSON object.

Intents (field "intent"):
- query_relation: relationships between two or more entities
- query_attribute: properties of one entity
- spatial_analysis: location-based questions (distribution, presence, trajectories)
- temporal_analysis: events within a time frame
- complex_analysis: needs to be split into ordered sub_tasks

Entities (field "entities"), each value a string or a list of strings:
- theme: business theme, one or more of: {themes}
- maptype: visualization, one or more of: {maptypes}
- location: administrative areas, police districts or places
- poi: the subject shown on the map (venues, incidents, people, vehicles)
- person, vehicle, case, time, relation: include when mentioned

Rules (non-negotiable):
1) Reply with a single valid JSON object and nothing else.
2) Use only the listed values for theme and maptype; omit a field you cannot determine.
3) For complex_analysis, add "sub_tasks": a list of objects with task_id, intent,
   description and entities.
"#
    )
}
