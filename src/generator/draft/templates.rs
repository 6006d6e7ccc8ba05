pub const TWITTER_RUBRIC: &str = "1. Start with a KILLER HOOK - make them stop scrolling
   - Use a shocking statistic, question, or contrarian take
   - First tweet must be punchy (under 280 chars)

2. Thread Structure (8-12 tweets):
   - Hook (tweet 1)
   - Context/problem (tweets 2-3)
   - Main insights using the angles above (tweets 4-8)
   - Actionable takeaway or call-to-action (tweet 9-10)
   - Closing hook/summary (final tweet)

3. Formatting:
   - Short sentences (under 20 words)
   - Use line breaks for readability (like a poem)
   - Strategic emoji use (2-3 per tweet max, meaningful only)
   - Number the tweets (1/10, 2/10, etc.)
   - NO bolding or markdown headers (no # or **)

4. Writing Style:
   - Poetic but professional
   - Short, punchy lines
   - Friendly, slightly humorous tone
   - Use \"you\" to speak directly to reader

5. Virality Elements:
   - Controversial or surprising angles
   - Relatable examples
   - Quotable one-liners
   - Emotional resonance";

pub const LINKEDIN_RUBRIC: &str = "1. POWERFUL OPENING (First 2 lines):
   - Hook them before the \"see more\" cut-off
   - Use a bold statement, question, or story opening
   - Make it personal or provocative

2. Post Structure:
   - Hook (2 lines)
   - Story or context (1 paragraph)
   - Main insights using angles (3-4 short paragraphs)
   - Actionable takeaway
   - Call-to-action or thought-provoking question

3. Formatting:
   - Single-line paragraphs for scannability
   - White space is your friend (like a poem)
   - NO titles or headers (no # or ##)
   - NO bolding (**text**) - plain text only
   - Strategic use of emojis (3-5 total)

4. Writing Style:
   - Short, punchy lines
   - Friendly, realistic humor
   - Transitions must be smooth and natural
   - No \"Here is a post\" or meta-commentary

5. Virality Elements:
   - Counter-intuitive insights
   - Relatable professional scenarios
   - Quotable wisdom
   - Spark conversation in comments";
