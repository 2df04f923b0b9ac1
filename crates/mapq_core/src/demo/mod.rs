use serde_json::json;

use crate::domain::PipelineOutput;

/// Analyst queries used to demonstrate the full refine + extract + validate flow.
pub fn demo_queries() -> Vec<&'static str> {
    vec![
        "制作一张康美村涉毒警情分布图，只显示一类警情的具体点位",
        "我想知道铜陵镇涉毒场所的分布位置，在地图上显示",
        "漳州市钟法路警务区内工厂的具体位置",
    ]
}

fn payload(query: &str, refined: &str, intent: serde_json::Value) -> PipelineOutput {
    let mut out = PipelineOutput::for_query(query);
    out.set_refined_query(refined);
    out.set_structured_intent(intent);
    out
}

/// Deterministic pipeline payloads for running the validator without a model backend.
///
/// Together they exercise every issue code at least once.
pub fn demo_pipeline_outputs() -> Vec<PipelineOutput> {
    vec![
        payload(
            "制作一张康美村涉毒警情分布图，只显示一类警情的具体点位",
            "制作一张康美村涉毒警情的散点图",
            json!({
                "intent": "spatial_analysis",
                "entities": {
                    "theme": ["禁毒"],
                    "maptype": "散点图",
                    "location": ["康美村"],
                    "poi": ["涉毒警情点位"]
                }
            }),
        ),
        payload(
            "我想知道铜陵镇涉毒场所的分布位置，在地图上显示",
            "制作一张漳州市铜陵镇涉毒场所的分布图",
            json!({
                "intent": "spatial_analysis",
                "entities": {
                    "location": ["漳州市铜陵镇"],
                    "poi": ["涉毒场所"]
                }
            }),
        ),
        payload(
            "漳州市钟法路警务区内工厂的具体位置",
            "制作一张漳州市钟法路警务区内工厂的散点图",
            json!(r#"{"intent": "spatial_analysis", "entities": {"theme": ["要素管控", "工厂巡查"], "maptype": ["散点图", "饼图"], "location": "漳州市钟法路警务区", "poi": ["工厂"]}}"#),
        ),
        payload(
            "惠东县禁毒热力图",
            "制作一张惠州市惠东县涉毒人员的热力分布图",
            json!({
                "intent": "spatial_analysis",
                "entities": {"theme": "禁毒"}
            }),
        ),
        payload(
            "看看最近的情况",
            "看看最近的情况",
            json!({"intent": "query_attribute", "entities": {}}),
        ),
    ]
}
