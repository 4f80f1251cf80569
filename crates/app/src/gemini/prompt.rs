//! Prompt text and request builders for fortune and image generation.

use paw_fortune_core::{Animal, Rarity, UserProfile};

use super::types::{Content, GenerateContentRequest, GenerationConfig, Schema};

/// User turn for the text model.
pub const FORTUNE_PROMPT: &str = "Generate a new daily fortune blind box concept. Focus on DYNAMIC ACTION and PROPS. No boring poses.";

/// Sampling temperature for the text model; high for variety.
pub const FORTUNE_TEMPERATURE: f64 = 1.2;

const CONTEXT_UNKNOWN: &str = "用户背景: 未提供 (随机生成).";

const SYSTEM_HEAD: &str = r#"你是一个数字盲盒品牌 "PawFortune" (爪爪运势) 的创意总监。

你的任务:
生成一个独特的每日运势盲盒概念。

【重要规则】
1. **语言混合**:
   - 所有描述、名字、运势语必须用 **简体中文**。
   - **唯一例外**: "baseLabel" (底座上的字) 必须是 **英文 (English)**，且非常短 (1-2个单词)。
2. **动物选择**:
   - 必须在 "Cat" (猫) 和 "Dog" (狗) 之间随机选择，概率各 50%。
   - 使用随机的具体品种，例如：柴犬、柯基、哈士奇、加菲猫、无毛猫、布偶猫等。
3. **【核心要求】动作与道具 (Dynamic Poses & Props)**:
   - **严禁**：不要让动物只是简单的站着 (Just standing) 或坐着 (Just sitting)。这是无聊的。
   - **必须有动作**：例如：正在滑滑板、在做后空翻、正在打碟 (DJ)、正在做瑜伽倒立、在太空漫步、在举重、在吃一大碗拉面、在疯狂敲代码。
   - **必须持有道具**：道具应该比动物的比例稍微夸张一点。例如：抱着巨大的珍珠奶茶、拿着光剑、背着喷气背包、戴着潜水镜和脚蹼、拿着游戏手柄。
   - **表情**：根据动作匹配表情（例如：举重时面部狰狞，吃东西时一脸幸福）。
4. **运势好坏**:
   - 运势应该有好有坏，或者是提醒。根据用户的星座/生肖/生日特性来决定。
5. **视觉风格**:
   - 极度追求细节。动物必须穿着独特的服饰。
   - 必须看起来像昂贵的 "3D打印树脂模型" 或 "盲盒玩具"。
6. **【关键】稀有度概率控制 (Rarity Probability)**:
   - 请严格模拟真实的盲盒抽奖概率，**不要**总是生成稀有款：
   - **Common (普通)**: 60% 概率 (这是最常见的情况，请多生成这个)
   - **Rare (稀有)**: 30% 概率
   - **Ultra Rare (史诗)**: 8% 概率
   - **Secret (隐藏)**: 2% 概率
"#;

const SYSTEM_FIELDS: &str = r#"输出字段要求:
- animal: 'cat' 或 'dog'
- title: 手办的名字 (中文)，例如 "摸鱼大师", "暴富梦", "夜宵之王"。
- actionDescription: **极度简短** 的中文描述，不超过15个字。重点描述动作和道具。例如："脚踩滑板手拿披萨的缅因猫" 或 "倒立着喝可乐的拉布拉多狗"。
- fortuneQuote: 每日运势建议 (中文)。
- baseLabel: **必须是极短的英文** (例如 "LUCKY", "YUMMY", "GYM", "NO WORK")。
- visualPrompt: 一个极度详细的英文图像生成提示词。
  - **关键**: 必须详细描述动作 (Action) 和 道具 (Prop)。
  - 必须包含: "3D render, octane render, c4d, resin toy texture, studio lighting, cute, blind box style, masterpiece, 8k, dynamic pose, highly detailed".
  - **强制包含**: 描述具体的四肢位置。例如: "paws raised high", "jumping in the air", "one paw holding a [prop]".
  - 不要把 "baseLabel" 的文字包含在 "visualPrompt" 的描述里。
- rarity: 'Common', 'Rare', 'Ultra Rare', 'Secret'.
"#;

/// System instruction for the text model, with the user's background.
#[must_use]
pub fn system_instruction(profile: Option<&UserProfile>) -> String {
    let context = profile.map_or_else(|| CONTEXT_UNKNOWN.to_string(), UserProfile::context_line);
    format!("{SYSTEM_HEAD}\n{}\n\n{SYSTEM_FIELDS}", context.trim_end())
}

/// Schema forcing all seven fortune fields.
#[must_use]
pub fn fortune_schema() -> Schema {
    Schema::object_all_required(vec![
        (
            "animal",
            Schema::string_enum([Animal::Cat, Animal::Dog].map(Animal::as_str)),
        ),
        ("title", Schema::string()),
        ("actionDescription", Schema::string()),
        ("fortuneQuote", Schema::string()),
        ("baseLabel", Schema::string()),
        ("visualPrompt", Schema::string()),
        ("rarity", Schema::string_enum(Rarity::ALL.map(Rarity::as_str))),
    ])
}

/// Full text-model request for `profile`.
#[must_use]
pub fn fortune_request(profile: Option<&UserProfile>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(FORTUNE_PROMPT)],
        system_instruction: Some(Content::system(system_instruction(profile))),
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(fortune_schema()),
            temperature: Some(FORTUNE_TEMPERATURE),
        }),
    }
}

/// Figurine prompt wrapped around the model-written visual prompt.
#[must_use]
pub fn image_prompt(visual_prompt: &str) -> String {
    format!(
        "Design a high-quality 3D collectible blind box figurine.

STYLE KEYWORDS: 3D render, Cinema 4D, Octane Render, Redshift, Resin Toy Texture, Subsurface Scattering, Soft Studio Lighting, High Fidelity, 8k resolution, Chibi style.

SUBJECT: {visual_prompt}

IMPORTANT:
- **ACTION**: The character must be DOING something. Do NOT generate a static standing pose.
- **PROPS**: Ensure the props described are clearly visible and interacting with the character.
- **VIEW**: Use a dynamic camera angle (slightly low angle or 3/4 view) to enhance the action.

BASE: The figurine stands on a simple, plain circular platform.
BACKGROUND: A soft, solid pastel color gradient (studio backdrop).
DETAILS: Make it look like a physical high-end toy. High quality plastic/vinyl material. Vivid colors.
"
    )
}

/// Image-model request; default generation settings.
#[must_use]
pub fn image_request(visual_prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest::user_text(image_prompt(visual_prompt))
}
